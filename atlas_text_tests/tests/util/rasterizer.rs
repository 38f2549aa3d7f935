// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A synthetic proportional font.

use atlas_text::{
    FontMetrics, GlyphBitmap, GlyphRasterizer, RasterError, RasterizedGlyph, RenderOptions,
};

pub(crate) const ASCENT: i32 = 14;
pub(crate) const DESCENT: i32 = 4;
pub(crate) const LINE_HEIGHT: i32 = 20;

/// A 20pt font whose glyphs are solid blocks as wide as their advance.
///
/// - narrow punctuation and `i`, `l`: 4px
/// - `m`, `w`, `M`, `W`: 14px
/// - space: 5px, no ink
/// - private use codepoints: unmapped, no advance
/// - everything else: 10px
#[derive(Debug, Default)]
pub(crate) struct ProportionalRasterizer {
    failing: Vec<char>,
    slanted: bool,
    pub(crate) raster_calls: usize,
}

impl ProportionalRasterizer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes rasterization of `ch` fail.
    pub(crate) fn failing(mut self, ch: char) -> Self {
        self.failing.push(ch);
        self
    }

    pub(crate) fn slanted(mut self) -> Self {
        self.slanted = true;
        self
    }

    pub(crate) fn advance_of(ch: char) -> i32 {
        match ch {
            ' ' => 5,
            'i' | 'l' | '.' | ',' | '\'' | '!' | '|' | ':' | ';' => 4,
            'm' | 'w' | 'M' | 'W' => 14,
            '\u{E000}'..='\u{F8FF}' => 0,
            _ => 10,
        }
    }
}

impl GlyphRasterizer for ProportionalRasterizer {
    fn font_metrics(&self, _options: &RenderOptions) -> FontMetrics {
        FontMetrics {
            point_size: 20.0,
            ascent: ASCENT,
            descent: DESCENT,
            line_height: LINE_HEIGHT,
            slanted: self.slanted,
        }
    }

    fn advance(&mut self, ch: char, _options: &RenderOptions) -> i32 {
        Self::advance_of(ch)
    }

    fn rasterize(
        &mut self,
        ch: char,
        _options: &RenderOptions,
    ) -> Result<RasterizedGlyph, RasterError> {
        self.raster_calls += 1;
        if self.failing.contains(&ch) {
            return Err(RasterError::new(ch, "glyph outline is corrupt"));
        }
        let advance = Self::advance_of(ch);
        if advance == 0 || ch.is_whitespace() {
            return Ok(RasterizedGlyph {
                advance,
                ..RasterizedGlyph::default()
            });
        }
        let width = advance as u32;
        let height = (ASCENT + DESCENT) as u32;
        Ok(RasterizedGlyph {
            bitmap: GlyphBitmap {
                width,
                height,
                left: 0,
                top: ASCENT,
                coverage: vec![0xFF; (width * height) as usize],
            },
            advance,
        })
    }
}
