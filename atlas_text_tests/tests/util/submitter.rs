// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A draw submitter that keeps copies of everything it is asked to draw.

use atlas_text::kurbo::Affine;
use atlas_text::{DrawCall, DrawSubmitter, GlyphVertex, MultiDrawCall, PageBinding, StagingBuffer};

/// One draw or multi-draw call, with its vertices copied out of the staging buffer.
#[derive(Clone, Debug)]
pub(crate) struct RecordedDraw {
    pub(crate) binding: PageBinding,
    /// `(first_vertex, vertex_count)` of every range.
    pub(crate) ranges: Vec<(u32, u32)>,
    pub(crate) multi: bool,
    pub(crate) transform: Affine,
    pub(crate) vertices: Vec<GlyphVertex>,
}

impl RecordedDraw {
    /// The quads of this call, in vertex order.
    pub(crate) fn quads(&self) -> Vec<QuadView> {
        self.vertices
            .chunks_exact(6)
            .map(|quad| QuadView::new(quad, self.binding.page))
            .collect()
    }

    /// Translation part of the transform.
    pub(crate) fn offset(&self) -> (f64, f64) {
        let coeffs = self.transform.as_coeffs();
        (coeffs[4], coeffs[5])
    }

    /// Horizontal scale part of the transform.
    pub(crate) fn scale(&self) -> f64 {
        self.transform.as_coeffs()[0]
    }
}

/// A glyph quad reassembled from its six vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct QuadView {
    pub(crate) x0: f32,
    pub(crate) x1: f32,
    pub(crate) y0: f32,
    pub(crate) y1: f32,
    /// RGBA of the left edge.
    pub(crate) left: [u8; 4],
    /// RGBA of the right edge.
    pub(crate) right: [u8; 4],
    pub(crate) page: u32,
}

impl QuadView {
    fn new(vertices: &[GlyphVertex], page: u32) -> Self {
        // Top right, top left, bottom right, top left, bottom left, bottom right.
        let (top_right, top_left, bottom_left) = (vertices[0], vertices[1], vertices[4]);
        Self {
            x0: top_left.position[0],
            x1: top_right.position[0],
            y0: top_left.position[1],
            y1: bottom_left.position[1],
            left: top_left.color.to_le_bytes(),
            right: top_right.color.to_le_bytes(),
            page,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSubmitter {
    pub(crate) draws: Vec<RecordedDraw>,
}

impl RecordingSubmitter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.draws.clear();
    }

    /// All quads of all calls, in submission order.
    pub(crate) fn quads(&self) -> Vec<QuadView> {
        self.draws.iter().flat_map(RecordedDraw::quads).collect()
    }

    fn record(
        &mut self,
        staging: &StagingBuffer,
        binding: PageBinding,
        ranges: Vec<(u32, u32)>,
        multi: bool,
        transform: Affine,
    ) {
        let vertices = ranges
            .iter()
            .flat_map(|&(first, count)| first..first + count)
            .map(|index| {
                staging
                    .vertex(index as usize)
                    .expect("draw call references vertices outside the staging buffer")
            })
            .collect();
        self.draws.push(RecordedDraw {
            binding,
            ranges,
            multi,
            transform,
            vertices,
        });
    }
}

impl DrawSubmitter for RecordingSubmitter {
    fn draw(&mut self, call: &DrawCall<'_>) {
        self.record(
            call.staging,
            call.binding,
            vec![(call.first_vertex, call.vertex_count)],
            false,
            call.transform,
        );
    }

    fn multi_draw(&mut self, call: &MultiDrawCall<'_>) {
        assert_eq!(
            call.first_vertices.len(),
            call.vertex_counts.len(),
            "multi-draw range lists differ in length"
        );
        let ranges = call
            .first_vertices
            .iter()
            .copied()
            .zip(call.vertex_counts.iter().copied())
            .collect();
        self.record(call.staging, call.binding, ranges, true, call.transform);
    }
}
