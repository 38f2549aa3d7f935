// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The glyph vertex format.

use bytemuck::{Pod, Zeroable};

use crate::atlas::UvRect;
use crate::math::unorm16;

/// One vertex of a glyph quad. 16 bytes.
///
/// | offset | field      | format                           |
/// |--------|------------|----------------------------------|
/// | 0      | `position` | 2 x f32, local text units        |
/// | 8      | `uv`       | 2 x u16, normalized to `0..=1`   |
/// | 12     | `color`    | RGBA8, red in the lowest byte    |
///
/// The atlas page is not part of the vertex; it is bound per draw call.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GlyphVertex {
    /// Position before the draw call's transform.
    pub position: [f32; 2],
    /// Texture coordinates.
    pub uv: [u16; 2],
    /// Packed color.
    pub color: u32,
}

const _: () = assert!(size_of::<GlyphVertex>() == 16, "glyph vertices are 16 bytes");

/// Size of a vertex in bytes.
pub const VERTEX_SIZE: usize = size_of::<GlyphVertex>();

/// Vertices emitted per glyph (two triangles).
pub const VERTICES_PER_GLYPH: usize = 6;

/// A glyph quad in local text units, ready to be written as vertices.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GlyphQuad {
    pub(crate) x0: f32,
    pub(crate) y0: f32,
    pub(crate) x1: f32,
    pub(crate) y1: f32,
    pub(crate) uv: UvRect,
    pub(crate) left: u32,
    pub(crate) right: u32,
    pub(crate) page: u32,
}

impl GlyphQuad {
    /// Two triangles; the left edge carries `left`, the right edge `right`.
    pub(crate) fn vertices(&self) -> [GlyphVertex; VERTICES_PER_GLYPH] {
        let (u0, v0) = (unorm16(self.uv.u0), unorm16(self.uv.v0));
        let (u1, v1) = (unorm16(self.uv.u1), unorm16(self.uv.v1));
        let top_right = GlyphVertex {
            position: [self.x1, self.y0],
            uv: [u1, v0],
            color: self.right,
        };
        let top_left = GlyphVertex {
            position: [self.x0, self.y0],
            uv: [u0, v0],
            color: self.left,
        };
        let bottom_right = GlyphVertex {
            position: [self.x1, self.y1],
            uv: [u1, v1],
            color: self.right,
        };
        let bottom_left = GlyphVertex {
            position: [self.x0, self.y1],
            uv: [u0, v1],
            color: self.left,
        };
        [
            top_right,
            top_left,
            bottom_right,
            top_left,
            bottom_left,
            bottom_right,
        ]
    }
}
