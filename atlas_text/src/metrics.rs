// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized per-codepoint widths.

use hashbrown::HashMap;

use crate::math::slant_allowance;
use crate::rasterizer::{FontMetrics, GlyphRasterizer, RenderOptions};

#[derive(Clone, Copy, Debug)]
struct Widths {
    advance: i32,
    layout: i32,
    // Published as a placeholder; measured as an em-box until the next reset.
    placeholder: bool,
}

/// Memoized advance and cell widths for one font instance.
///
/// Widths are pure functions of the codepoint and the font, so entries are never
/// invalidated. Codepoints the atlas could only publish as placeholders are measured
/// with the placeholder's em-box width until the atlas is reset.
#[derive(Clone, Debug)]
pub struct MetricsCache {
    font: FontMetrics,
    options: RenderOptions,
    slant: i32,
    widths: HashMap<char, Widths>,
}

impl MetricsCache {
    /// Creates an empty cache for a font with the given metrics.
    pub fn new(font: FontMetrics, options: RenderOptions) -> Self {
        let slant = if font.slanted {
            slant_allowance(font.line_height, options.italic_angle)
        } else {
            0
        };
        Self {
            font,
            options,
            slant,
            widths: HashMap::new(),
        }
    }

    fn entry<R: GlyphRasterizer + ?Sized>(&mut self, ch: char, rasterizer: &mut R) -> Widths {
        if let Some(widths) = self.widths.get(&ch) {
            return *widths;
        }
        let advance = rasterizer.advance(ch, &self.options).max(0);
        let layout = if advance == 0 {
            self.font.char_height()
        } else {
            advance
        };
        let widths = Widths {
            advance,
            layout,
            placeholder: false,
        };
        self.widths.insert(ch, widths);
        widths
    }

    /// Layout advance of `ch`. Codepoints without an advance take the width of an em-box.
    pub fn width<R: GlyphRasterizer + ?Sized>(&mut self, ch: char, rasterizer: &mut R) -> i32 {
        let widths = self.entry(ch, rasterizer);
        if widths.placeholder {
            self.font.char_height()
        } else {
            widths.layout
        }
    }

    /// Width of the rendered glyph: the layout advance plus room for the slant of italic faces.
    ///
    /// Always at least [`width`](Self::width).
    pub fn render_width<R: GlyphRasterizer + ?Sized>(
        &mut self,
        ch: char,
        rasterizer: &mut R,
    ) -> i32 {
        self.entry(ch, rasterizer).layout + self.slant
    }

    /// Width of the inked part of an atlas cell. Zero for codepoints without an advance.
    pub fn ink_width<R: GlyphRasterizer + ?Sized>(&mut self, ch: char, rasterizer: &mut R) -> i32 {
        let widths = self.entry(ch, rasterizer);
        if widths.advance == 0 {
            0
        } else {
            widths.layout + self.slant
        }
    }

    /// Measures `ch` as a placeholder em-box from now on.
    pub(crate) fn mark_placeholder(&mut self, ch: char) {
        let char_height = self.font.char_height();
        self.widths
            .entry(ch)
            .and_modify(|widths| widths.placeholder = true)
            .or_insert(Widths {
                advance: char_height,
                layout: char_height,
                placeholder: true,
            });
    }

    /// Measures every codepoint by its rasterizer advance again.
    pub(crate) fn forget_placeholders(&mut self) {
        for widths in self.widths.values_mut() {
            widths.placeholder = false;
        }
    }

    /// Horizontal room added to every glyph of a slanted face.
    pub fn slant(&self) -> i32 {
        self.slant
    }

    /// Font metrics the cache was created with.
    pub fn font(&self) -> &FontMetrics {
        &self.font
    }

    /// Number of memoized codepoints.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Whether nothing has been measured yet.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}
