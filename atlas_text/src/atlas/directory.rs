// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Codepoint to glyph record lookup.

use std::sync::Arc;

use hashbrown::HashMap;

use super::queue::PendingQueue;
use super::region::GlyphRecord;

/// Published glyph records, plus the queue of codepoints still waiting for one.
#[derive(Debug, Default)]
pub struct GlyphDirectory {
    records: HashMap<char, GlyphRecord>,
    queue: Arc<PendingQueue>,
}

impl GlyphDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `ch`, or requests it and returns `None`.
    ///
    /// Repeated calls for the same missing codepoint enqueue it only once.
    pub fn resolve(&self, ch: char) -> Option<GlyphRecord> {
        if let Some(record) = self.records.get(&ch) {
            return Some(*record);
        }
        if self.queue.request(ch) {
            log::trace!("queued U+{:04X} for rasterization", u32::from(ch));
        }
        None
    }

    /// Returns the record for `ch` without requesting it.
    pub fn get(&self, ch: char) -> Option<&GlyphRecord> {
        self.records.get(&ch)
    }

    /// The pending queue. Clones of the handle may be used to request glyphs from other
    /// threads.
    pub fn queue(&self) -> &Arc<PendingQueue> {
        &self.queue
    }

    pub(crate) fn publish(&mut self, ch: char, record: GlyphRecord) {
        self.records.insert(ch, record);
    }

    /// Number of published records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all published records.
    pub fn iter(&self) -> impl Iterator<Item = (char, &GlyphRecord)> + '_ {
        self.records.iter().map(|(ch, record)| (*ch, record))
    }

    /// Drops every record and every pending or past request.
    pub fn clear(&mut self) {
        self.records.clear();
        self.queue.clear();
    }
}
