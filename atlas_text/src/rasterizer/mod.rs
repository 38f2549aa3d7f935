// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The glyph rasterization seam.
//!
//! A [`GlyphRasterizer`] turns one codepoint of one font instance into an alpha coverage
//! bitmap plus layout metrics. The atlas never looks at font files itself.

#[cfg(feature = "swash")]
pub mod swash;

use crate::error::RasterError;

/// Options that affect how glyphs are rasterized and measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Produce smooth coverage. When off, coverage is thresholded to fully on or off.
    pub antialias: bool,
    /// Measure advances with sub-pixel precision before rounding up.
    pub fractional_metrics: bool,
    /// Slant of italic faces, in degrees. Widens the atlas cell of slanted glyphs.
    pub italic_angle: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            fractional_metrics: false,
            italic_angle: 10.0,
        }
    }
}

/// Vertical metrics of a font instance, in whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontMetrics {
    /// Point size the metrics were computed at.
    pub point_size: f32,
    /// Distance from the top of the line to the baseline.
    pub ascent: i32,
    /// Distance from the baseline to the bottom of the glyph box.
    pub descent: i32,
    /// Full line height, including leading. Also the height of an atlas shelf.
    pub line_height: i32,
    /// Whether the face is italic or oblique.
    pub slanted: bool,
}

impl FontMetrics {
    /// Height of a glyph box: ascent plus descent.
    pub fn char_height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// An 8-bit alpha coverage bitmap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Offset from the pen position to the left edge of the bitmap.
    pub left: i32,
    /// Offset from the baseline up to the top edge of the bitmap.
    pub top: i32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// The result of rasterizing one codepoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RasterizedGlyph {
    /// Coverage bitmap. Empty for glyphs without ink.
    pub bitmap: GlyphBitmap,
    /// Horizontal advance, in whole pixels.
    pub advance: i32,
}

impl RasterizedGlyph {
    /// Whether the glyph has no visible ink.
    pub fn is_empty(&self) -> bool {
        self.bitmap.width == 0 || self.bitmap.height == 0
    }
}

/// Rasterizes glyphs of a single font instance.
///
/// Implementations are called from [`FontRenderer::tick`](crate::FontRenderer::tick) on
/// the render thread only.
pub trait GlyphRasterizer {
    /// Vertical metrics of the font instance.
    fn font_metrics(&self, options: &RenderOptions) -> FontMetrics;

    /// Advance of `ch` in whole pixels. Returns 0 for codepoints the font cannot map.
    fn advance(&mut self, ch: char, options: &RenderOptions) -> i32;

    /// Rasterizes `ch`.
    fn rasterize(&mut self, ch: char, options: &RenderOptions)
        -> Result<RasterizedGlyph, RasterError>;
}

impl<R: GlyphRasterizer + ?Sized> GlyphRasterizer for Box<R> {
    fn font_metrics(&self, options: &RenderOptions) -> FontMetrics {
        (**self).font_metrics(options)
    }

    fn advance(&mut self, ch: char, options: &RenderOptions) -> i32 {
        (**self).advance(ch, options)
    }

    fn rasterize(
        &mut self,
        ch: char,
        options: &RenderOptions,
    ) -> Result<RasterizedGlyph, RasterError> {
        (**self).rasterize(ch, options)
    }
}

/// Converts coverage to fully on or off, for rasterizers without a non-antialiased mode.
pub fn threshold_coverage(coverage: &mut [u8]) {
    for value in coverage {
        *value = if *value >= 0x80 { 0xFF } else { 0 };
    }
}
