//! Bounded FIFO cache of synthesized audio
//!
//! Strict insertion-order eviction: a hit does not refresh recency, and
//! replacing an existing key keeps its original position. Entries live for
//! the life of the process; there is no TTL.

use bytes::Bytes;
use std::collections::VecDeque;
use tracing::debug;

struct CacheEntry {
    key: String,
    bytes: Bytes,
}

pub struct AudioCache {
    entries: VecDeque<CacheEntry>,
    max_entries: usize,
}

impl AudioCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// Pure lookup; `None` on a miss.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.bytes.clone())
    }

    /// Insert, evicting the oldest-inserted entry when full. Re-inserting
    /// an existing key replaces the value without changing its position.
    pub fn insert(&mut self, key: impl Into<String>, bytes: Bytes) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.bytes = bytes;
            return;
        }
        if self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(key = %evicted.key, "evicted oldest cached audio");
            }
        }
        self.entries.push_back(CacheEntry { key, bytes });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
