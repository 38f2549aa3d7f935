// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas cells and per-glyph records.

/// An axis-aligned rectangle in page pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl PixelRect {
    /// Creates a rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the pixel at `(x, y)` lies inside.
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the two rectangles share at least one pixel.
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Normalized texture coordinates of a glyph within its page.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UvRect {
    /// Left.
    pub u0: f32,
    /// Top.
    pub v0: f32,
    /// Right.
    pub u1: f32,
    /// Bottom.
    pub v1: f32,
}

impl UvRect {
    /// Normalizes pixel edges against a square page of `page_size` pixels.
    #[allow(
        clippy::cast_precision_loss,
        reason = "page coordinates are far below 2^24"
    )]
    pub fn from_pixels(x0: u32, y0: u32, x1: u32, y1: u32, page_size: u32) -> Self {
        let size = page_size as f32;
        Self {
            u0: x0 as f32 / size,
            v0: y0 as f32 / size,
            u1: x1 as f32 / size,
            v1: y1 as f32 / size,
        }
    }

    /// Whether the rectangle has no area.
    pub fn is_degenerate(&self) -> bool {
        self.u0 >= self.u1 || self.v0 >= self.v1
    }
}

/// Everything the batch compiler needs to draw one codepoint.
///
/// Records are immutable once published, until the atlas is reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphRecord {
    /// Horizontal pen advance, in pixels at the font's point size.
    pub advance: i32,
    /// Width of the quad. Zero for glyphs without ink, which draw nothing.
    pub render_width: i32,
    /// Height of the quad.
    pub height: i32,
    /// Page holding the glyph's pixels.
    pub page: u32,
    /// Texture coordinates of the inked area.
    pub uv: UvRect,
    /// The cell reserved for the glyph, padding included. `None` for glyphs that failed
    /// to rasterize.
    pub cell: Option<PixelRect>,
}

impl GlyphRecord {
    /// A record drawn as an empty em-box, used for glyphs that could not be rasterized.
    pub fn placeholder(em_width: i32, height: i32) -> Self {
        Self {
            advance: em_width,
            render_width: 0,
            height,
            page: 0,
            uv: UvRect::default(),
            cell: None,
        }
    }

    /// Whether the glyph has nothing to draw.
    pub fn is_blank(&self) -> bool {
        self.render_width == 0
    }
}
