// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`GlyphRasterizer`] backed by swash.

use std::sync::Arc;

use swash::scale::{Render, ScaleContext, Source};
use swash::{zeno, FontRef, Style};

use super::{
    threshold_coverage, FontMetrics, GlyphBitmap, GlyphRasterizer, RasterizedGlyph, RenderOptions,
};
use crate::error::{Error, RasterError};
use crate::math::trunc_i32;

/// Rasterizes glyphs from an in-memory font file at a fixed size.
pub struct SwashRasterizer {
    data: Arc<[u8]>,
    index: usize,
    size: f32,
    hint: bool,
    context: ScaleContext,
}

impl core::fmt::Debug for SwashRasterizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwashRasterizer")
            .field("data_len", &self.data.len())
            .field("index", &self.index)
            .field("size", &self.size)
            .field("hint", &self.hint)
            .finish_non_exhaustive()
    }
}

impl SwashRasterizer {
    /// Creates a rasterizer for face `index` of the font file `data`, at `size` pixels per em.
    pub fn new(data: impl Into<Arc<[u8]>>, index: usize, size: f32) -> Result<Self, Error> {
        let data = data.into();
        if FontRef::from_index(&data, index).is_none() {
            return Err(Error::InvalidConfig("font data could not be parsed"));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(Error::InvalidConfig("font size must be positive"));
        }
        Ok(Self {
            data,
            index,
            size,
            hint: true,
            context: ScaleContext::new(),
        })
    }

    /// Enables or disables hinting. Hinting is on by default.
    pub fn with_hinting(mut self, hint: bool) -> Self {
        self.hint = hint;
        self
    }

    fn font(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(&self.data, self.index)
    }
}

fn advance_of(font: &FontRef<'_>, size: f32, ch: char, options: &RenderOptions) -> i32 {
    let glyph_id = font.charmap().map(ch);
    if glyph_id == 0 {
        return 0;
    }
    let advance = font.glyph_metrics(&[]).scale(size).advance_width(glyph_id);
    if options.fractional_metrics {
        trunc_i32(advance.ceil())
    } else {
        trunc_i32(advance.round())
    }
}

impl GlyphRasterizer for SwashRasterizer {
    fn font_metrics(&self, _options: &RenderOptions) -> FontMetrics {
        let Some(font) = self.font() else {
            return FontMetrics::default();
        };
        let metrics = font.metrics(&[]).scale(self.size);
        let ascent = trunc_i32(metrics.ascent.ceil());
        let descent = trunc_i32(metrics.descent.abs().ceil());
        let leading = trunc_i32(metrics.leading.max(0.0).ceil());
        FontMetrics {
            point_size: self.size,
            ascent,
            descent,
            line_height: ascent + descent + leading,
            slanted: !matches!(font.attributes().style(), Style::Normal),
        }
    }

    fn advance(&mut self, ch: char, options: &RenderOptions) -> i32 {
        self.font()
            .map_or(0, |font| advance_of(&font, self.size, ch, options))
    }

    fn rasterize(
        &mut self,
        ch: char,
        options: &RenderOptions,
    ) -> Result<RasterizedGlyph, RasterError> {
        let font = FontRef::from_index(&self.data, self.index)
            .ok_or_else(|| RasterError::new(ch, "font data is no longer valid"))?;
        let advance = advance_of(&font, self.size, ch, options);
        let glyph_id = font.charmap().map(ch);

        let mut scaler = self
            .context
            .builder(font)
            .size(self.size)
            .hint(self.hint)
            .build();
        let image = Render::new(&[Source::Outline])
            .format(zeno::Format::Alpha)
            .render(&mut scaler, glyph_id)
            .ok_or_else(|| RasterError::new(ch, "outline could not be rendered"))?;

        let mut coverage = image.data;
        if !options.antialias {
            threshold_coverage(&mut coverage);
        }
        Ok(RasterizedGlyph {
            bitmap: GlyphBitmap {
                width: image.placement.width,
                height: image.placement.height,
                left: image.placement.left,
                top: image.placement.top,
                coverage,
            },
            advance,
        })
    }
}
