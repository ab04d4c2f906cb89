//! Bounded pool of reusable playback handles
//!
//! The pool never blocks and never fails for lack of capacity: once it is
//! full and fully busy, acquisition falls back to a temporary handle the
//! pool refuses to track, trading memory for availability.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::handle::{HandleId, HandleState, PlaybackHandle};
use crate::output::{AudioOutput, PlaybackError};

/// Result of an acquisition: either a key into the pool map or a temporary
/// handle that never enters it.
pub enum AcquiredHandle {
    Pooled(HandleId),
    Temporary(PlaybackHandle),
}

pub struct HandlePool {
    handles: HashMap<HandleId, PlaybackHandle>,
    max_size: usize,
}

impl HandlePool {
    pub fn new(max_size: usize) -> Self {
        Self {
            handles: HashMap::new(),
            max_size,
        }
    }

    /// Create a pool pre-warmed with `warm` channels so the first playback
    /// does not pay channel-opening latency.
    pub fn with_warm_handles(
        max_size: usize,
        warm: usize,
        output: &dyn AudioOutput,
    ) -> Result<Self, PlaybackError> {
        let mut pool = Self::new(max_size);
        for _ in 0..warm.min(max_size) {
            let channel = output.open_channel()?;
            pool.handles
                .insert(HandleId::next(), PlaybackHandle::new(channel));
        }
        debug!(size = pool.handles.len(), "playback pool warmed");
        Ok(pool)
    }

    /// Hand out an idle pooled handle, growing the pool up to its bound.
    ///
    /// Idle handles are finalized (source freed) before reuse — this is
    /// where drained or superseded playback gets cleaned up. With the pool
    /// full and every handle busy, a temporary handle is opened instead.
    pub fn acquire(&mut self, output: &dyn AudioOutput) -> Result<AcquiredHandle, PlaybackError> {
        for (id, handle) in &mut self.handles {
            if handle.is_idle() {
                if handle.state() != HandleState::Idle {
                    trace!(?id, state = ?handle.state(), "finalizing handle before reuse");
                }
                handle.release();
                return Ok(AcquiredHandle::Pooled(*id));
            }
        }

        if self.handles.len() < self.max_size {
            let id = HandleId::next();
            self.handles
                .insert(id, PlaybackHandle::new(output.open_channel()?));
            debug!(?id, size = self.handles.len(), "grew playback pool");
            return Ok(AcquiredHandle::Pooled(id));
        }

        debug!("playback pool exhausted, allocating temporary handle");
        Ok(AcquiredHandle::Temporary(PlaybackHandle::new(
            output.open_channel()?,
        )))
    }

    pub fn get(&self, id: HandleId) -> Option<&PlaybackHandle> {
        self.handles.get(&id)
    }

    pub fn get_mut(&mut self, id: HandleId) -> Option<&mut PlaybackHandle> {
        self.handles.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
