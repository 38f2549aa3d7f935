// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The queue of codepoints waiting to be rasterized.

use std::collections::VecDeque;

use hashbrown::HashSet;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Pending {
    fifo: VecDeque<char>,
    // Every codepoint ever enqueued since the last reset.
    requested: HashSet<char>,
}

/// A deduplicating FIFO of codepoints.
///
/// A codepoint is accepted at most once between resets, so it is rasterized at most
/// once. The queue may be shared with other threads to pre-request glyphs; popping
/// happens on the render thread.
#[derive(Debug, Default)]
pub struct PendingQueue {
    inner: Mutex<Pending>,
}

impl PendingQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `ch` unless it was requested before. Returns whether it was enqueued.
    pub fn request(&self, ch: char) -> bool {
        let mut pending = self.inner.lock();
        if !pending.requested.insert(ch) {
            return false;
        }
        pending.fifo.push_back(ch);
        true
    }

    /// Whether `ch` has been requested since the last reset.
    pub fn is_requested(&self, ch: char) -> bool {
        self.inner.lock().requested.contains(&ch)
    }

    /// Pops up to `max` codepoints in request order.
    pub fn drain(&self, max: usize) -> Vec<char> {
        let mut pending = self.inner.lock();
        let count = max.min(pending.fifo.len());
        pending.fifo.drain(..count).collect()
    }

    /// Number of codepoints waiting.
    pub fn len(&self) -> usize {
        self.inner.lock().fifo.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().fifo.is_empty()
    }

    /// Forgets all queued and requested codepoints.
    pub fn clear(&self) {
        let mut pending = self.inner.lock();
        pending.fifo.clear();
        pending.requested.clear();
    }
}
