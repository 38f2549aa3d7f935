// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The draw submission seam.

use crate::backends::PageBinding;
use crate::kurbo::Affine;

use super::staging::StagingBuffer;

/// Primitive topology of glyph geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Topology {
    /// Independent triangles, six vertices per glyph.
    #[default]
    TriangleList,
}

/// A single contiguous draw.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall<'a> {
    /// Primitive topology.
    pub topology: Topology,
    /// Buffer the vertices live in.
    pub staging: &'a StagingBuffer,
    /// Index of the first vertex.
    pub first_vertex: u32,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Page texture to sample.
    pub binding: PageBinding,
    /// Maps local text units to the caller's coordinate space.
    pub transform: Affine,
}

/// Several vertex ranges sampling the same page, drawn in one call.
#[derive(Clone, Copy, Debug)]
pub struct MultiDrawCall<'a> {
    /// Primitive topology.
    pub topology: Topology,
    /// Buffer the vertices live in.
    pub staging: &'a StagingBuffer,
    /// First vertex of each range.
    pub first_vertices: &'a [u32],
    /// Vertex count of each range.
    pub vertex_counts: &'a [u32],
    /// Page texture to sample.
    pub binding: PageBinding,
    /// Maps local text units to the caller's coordinate space.
    pub transform: Affine,
}

/// Receives the draw calls of a compiled string.
pub trait DrawSubmitter {
    /// Draws one contiguous vertex range.
    fn draw(&mut self, call: &DrawCall<'_>);

    /// Draws several vertex ranges with the same page bound.
    ///
    /// The default implementation issues one [`draw`](Self::draw) per range.
    fn multi_draw(&mut self, call: &MultiDrawCall<'_>) {
        for (first_vertex, vertex_count) in call.first_vertices.iter().zip(call.vertex_counts) {
            self.draw(&DrawCall {
                topology: call.topology,
                staging: call.staging,
                first_vertex: *first_vertex,
                vertex_count: *vertex_count,
                binding: call.binding,
                transform: call.transform,
            });
        }
    }
}

impl<S: DrawSubmitter + ?Sized> DrawSubmitter for &mut S {
    fn draw(&mut self, call: &DrawCall<'_>) {
        (**self).draw(call);
    }

    fn multi_draw(&mut self, call: &MultiDrawCall<'_>) {
        (**self).multi_draw(call);
    }
}
