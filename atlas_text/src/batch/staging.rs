// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame vertex staging buffer.

use bytemuck::Pod;

use super::vertex::{GlyphVertex, VERTEX_SIZE};

/// Alignment of every reservation, in bytes.
pub const STAGING_ALIGNMENT: usize = 16;

/// A reserved byte range of a [`StagingBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StagingRange {
    /// Start, in bytes from the beginning of the buffer. A multiple of
    /// [`STAGING_ALIGNMENT`].
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl StagingRange {
    /// Index of the first vertex of the range.
    pub fn first_vertex(&self) -> usize {
        self.offset / VERTEX_SIZE
    }
}

/// A growable byte buffer shared by all draws of a frame.
///
/// Ranges are reserved with a bump cursor and written in place. The buffer is cleared
/// at the start of each frame by [`FontRenderer::tick`](crate::FontRenderer::tick).
#[derive(Clone, Debug, Default)]
pub struct StagingBuffer {
    bytes: Vec<u8>,
}

impl StagingBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `len` zeroed bytes, aligned to [`STAGING_ALIGNMENT`].
    pub fn reserve(&mut self, len: usize) -> StagingRange {
        let offset = self.bytes.len().next_multiple_of(STAGING_ALIGNMENT);
        self.bytes.resize(offset + len, 0);
        StagingRange { offset, len }
    }

    /// Copies `values` into `range`, starting `at` bytes into it.
    ///
    /// # Panics
    ///
    /// If the write would leave the range.
    pub fn write<T: Pod>(&mut self, range: StagingRange, at: usize, values: &[T]) {
        let src: &[u8] = bytemuck::cast_slice(values);
        assert!(
            at + src.len() <= range.len,
            "write of {} bytes at {at} overflows a {} byte range",
            src.len(),
            range.len
        );
        let start = range.offset + at;
        self.bytes[start..start + src.len()].copy_from_slice(src);
    }

    /// Reads back vertex `index`.
    pub fn vertex(&self, index: usize) -> Option<GlyphVertex> {
        let start = index * VERTEX_SIZE;
        let bytes = self.bytes.get(start..start + VERTEX_SIZE)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// The raw contents, for upload to a GPU buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes in use.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been reserved since the last clear.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Rewinds the cursor. Capacity is kept.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}
