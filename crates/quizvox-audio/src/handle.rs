//! Playback handle lifecycle
//!
//! A handle owns one output channel and tracks where it is in the
//! `Idle -> Loading -> Playing -> Idle` cycle. The pool observes these
//! states from the outside; there are no per-handle callbacks to leak.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::output::{OutputChannel, PlaybackError};

static HANDLE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque pool key for a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    pub(crate) fn next() -> Self {
        Self(HANDLE_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// Where a handle is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No source assigned; ready for checkout.
    Idle,
    /// A source was loaded but playback has not started.
    Loading,
    /// Playback was started. The source may since have drained; the pool
    /// finalizes drained handles when it next scans.
    Playing,
    /// The channel reported an error; release returns it to `Idle`.
    Errored,
}

/// One audio-output channel plus its lifecycle state.
pub struct PlaybackHandle {
    channel: Box<dyn OutputChannel>,
    state: HandleState,
}

impl PlaybackHandle {
    pub fn new(channel: Box<dyn OutputChannel>) -> Self {
        Self {
            channel,
            state: HandleState::Idle,
        }
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Available for (re)use: never loaded, errored, drained, or paused.
    pub fn is_idle(&self) -> bool {
        match self.state {
            HandleState::Idle | HandleState::Errored => true,
            HandleState::Loading => false,
            HandleState::Playing => {
                !self.channel.has_source()
                    || self.channel.is_finished()
                    || self.channel.is_paused()
            }
        }
    }

    /// Actively producing sound.
    pub fn is_active(&self) -> bool {
        self.state == HandleState::Playing
            && self.channel.has_source()
            && !self.channel.is_finished()
            && !self.channel.is_paused()
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<(), PlaybackError> {
        match self.channel.load(bytes) {
            Ok(()) => {
                self.state = HandleState::Loading;
                Ok(())
            }
            Err(e) => {
                self.state = HandleState::Errored;
                Err(e)
            }
        }
    }

    pub fn start(&mut self) -> Result<(), PlaybackError> {
        match self.channel.start() {
            Ok(()) => {
                self.state = HandleState::Playing;
                Ok(())
            }
            Err(e) => {
                self.state = HandleState::Errored;
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) {
        self.channel.pause();
    }

    /// Volume is clamped to `[0.0, 1.0]` regardless of what the caller asks
    /// for.
    pub fn set_volume(&mut self, volume: f32) {
        self.channel.set_volume(volume.clamp(0.0, 1.0));
    }

    /// Free the assigned source and return to `Idle`. Idempotent.
    pub fn release(&mut self) {
        self.channel.clear();
        self.state = HandleState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChannel;

    #[test]
    fn fresh_handle_is_idle() {
        let handle = PlaybackHandle::new(Box::new(FakeChannel::new()));
        assert_eq!(handle.state(), HandleState::Idle);
        assert!(handle.is_idle());
        assert!(!handle.is_active());
    }

    #[test]
    fn load_then_start_transitions_to_playing() {
        let mut handle = PlaybackHandle::new(Box::new(FakeChannel::new()));
        handle.load(b"clip").unwrap();
        assert_eq!(handle.state(), HandleState::Loading);
        assert!(!handle.is_idle());

        handle.start().unwrap();
        assert_eq!(handle.state(), HandleState::Playing);
        assert!(handle.is_active());
        assert!(!handle.is_idle());
    }

    #[test]
    fn drained_playing_handle_counts_as_idle() {
        let channel = FakeChannel::new();
        let probe = channel.probe();
        let mut handle = PlaybackHandle::new(Box::new(channel));
        handle.load(b"clip").unwrap();
        handle.start().unwrap();

        probe.lock().finished = true;
        assert!(handle.is_idle());
        assert!(!handle.is_active());
    }

    #[test]
    fn paused_playing_handle_counts_as_idle() {
        let mut handle = PlaybackHandle::new(Box::new(FakeChannel::new()));
        handle.load(b"clip").unwrap();
        handle.start().unwrap();
        handle.pause();
        assert!(handle.is_idle());
    }

    #[test]
    fn failed_load_marks_handle_errored() {
        let mut handle = PlaybackHandle::new(Box::new(FakeChannel::failing_load()));
        assert!(handle.load(b"clip").is_err());
        assert_eq!(handle.state(), HandleState::Errored);
        // Errored handles are reusable once released.
        assert!(handle.is_idle());
    }

    #[test]
    fn release_is_idempotent() {
        let channel = FakeChannel::new();
        let probe = channel.probe();
        let mut handle = PlaybackHandle::new(Box::new(channel));
        handle.load(b"clip").unwrap();
        handle.start().unwrap();

        handle.release();
        handle.release();
        assert_eq!(handle.state(), HandleState::Idle);
        assert!(!probe.lock().has_source);
        assert_eq!(probe.lock().clears, 2);
    }

    #[test]
    fn volume_is_clamped() {
        let channel = FakeChannel::new();
        let probe = channel.probe();
        let mut handle = PlaybackHandle::new(Box::new(channel));

        handle.set_volume(-0.5);
        assert_eq!(probe.lock().volume, Some(0.0));
        handle.set_volume(1.7);
        assert_eq!(probe.lock().volume, Some(1.0));
        handle.set_volume(0.4);
        assert_eq!(probe.lock().volume, Some(0.4));
    }
}
