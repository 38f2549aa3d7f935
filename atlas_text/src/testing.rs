// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test fixtures.

use hashbrown::{HashMap, HashSet};

use crate::error::RasterError;
use crate::rasterizer::{FontMetrics, GlyphBitmap, GlyphRasterizer, RasterizedGlyph, RenderOptions};

pub(crate) const ASCENT: i32 = 14;
pub(crate) const DESCENT: i32 = 4;
pub(crate) const LINE_HEIGHT: i32 = 20;

/// A 20px monospace font whose glyphs are solid blocks.
#[derive(Debug, Default)]
pub(crate) struct BlockRasterizer {
    advance: i32,
    overrides: HashMap<char, i32>,
    failing: HashSet<char>,
    slanted: bool,
    pub(crate) advance_calls: usize,
    pub(crate) raster_calls: usize,
}

impl BlockRasterizer {
    pub(crate) fn new(advance: i32) -> Self {
        Self {
            advance,
            ..Self::default()
        }
    }

    pub(crate) fn with_advance(mut self, ch: char, advance: i32) -> Self {
        self.overrides.insert(ch, advance);
        self
    }

    pub(crate) fn failing(mut self, ch: char) -> Self {
        self.failing.insert(ch);
        self
    }

    pub(crate) fn slanted(mut self) -> Self {
        self.slanted = true;
        self
    }

    fn advance_of(&self, ch: char) -> i32 {
        self.overrides.get(&ch).copied().unwrap_or(self.advance)
    }
}

impl GlyphRasterizer for BlockRasterizer {
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
        self.advance_calls += 1;
        self.advance_of(ch)
    }

    fn rasterize(
        &mut self,
        ch: char,
        _options: &RenderOptions,
    ) -> Result<RasterizedGlyph, RasterError> {
        self.raster_calls += 1;
        if self.failing.contains(&ch) {
            return Err(RasterError::new(ch, "injected failure"));
        }
        let advance = self.advance_of(ch);
        if advance <= 0 {
            return Ok(RasterizedGlyph::default());
        }
        let width = u32::try_from(advance).unwrap();
        let height = u32::try_from(ASCENT + DESCENT).unwrap();
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
