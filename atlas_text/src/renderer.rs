// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-font renderer facade.

use std::sync::Arc;

use crate::atlas::{AtlasAllocator, GlyphDirectory, GlyphRecord, PageState, PendingQueue};
use crate::backends::TextureBackend;
use crate::batch::{
    BatchCompiler, BatchSummary, DrawSubmitter, StagingBuffer, TextFill, TextStyle, WalkParams,
};
use crate::color_ext::Color;
use crate::config::RendererConfig;
use crate::error::Error;
use crate::kurbo::Affine;
use crate::markup::{MarkupScanner, Token};
use crate::metrics::MetricsCache;
use crate::pipeline::{PopulateReport, PopulationPipeline};
use crate::rasterizer::{FontMetrics, GlyphRasterizer};

/// A snapshot of atlas occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtlasStats {
    /// Published glyph records, placeholders included.
    pub glyphs: usize,
    /// Placeholders for glyphs that could not be rasterized or placed.
    pub failed: usize,
    /// Codepoints waiting to be populated.
    pub pending: usize,
    /// Pages with texture memory.
    pub pages: u32,
    /// Shelves holding at least one glyph.
    pub shelves: u32,
    /// Committed sparse tiles.
    pub committed_tiles: usize,
    /// Bytes written to the staging buffer this frame.
    pub staging_bytes: usize,
}

/// Renders text in one font instance through a glyph atlas.
///
/// Drawing never rasterizes: glyphs missing from the atlas are skipped and queued, and
/// show up once [`tick`](Self::tick) has populated them. All methods are meant to be
/// called from the render thread; [`pending_queue`](Self::pending_queue) may be used
/// from other threads to request glyphs ahead of time.
#[derive(Debug)]
pub struct FontRenderer<R> {
    config: RendererConfig,
    rasterizer: R,
    font: FontMetrics,
    metrics: MetricsCache,
    directory: GlyphDirectory,
    allocator: AtlasAllocator,
    pipeline: PopulationPipeline,
    compiler: BatchCompiler,
    staging: StagingBuffer,
}

impl<R: GlyphRasterizer> FontRenderer<R> {
    /// Creates a renderer. No textures are created until glyphs are populated.
    pub fn new(rasterizer: R, config: RendererConfig) -> Result<Self, Error> {
        config.validate()?;
        let font = rasterizer.font_metrics(&config.render_options);
        if font.line_height <= 0 || font.char_height() <= 0 {
            return Err(Error::InvalidConfig("font has no vertical extent"));
        }
        let shelf_height = u32::try_from(font.line_height).unwrap_or(u32::MAX);
        if shelf_height > config.atlas.page_size {
            return Err(Error::InvalidConfig(
                "line height exceeds the atlas page size",
            ));
        }
        let padding = config.atlas.scaled_padding(font.point_size);
        log::debug!(
            "font renderer at {}pt: line height {shelf_height}, padding {padding}, {:?}",
            font.point_size,
            config.atlas.store
        );
        Ok(Self {
            metrics: MetricsCache::new(font, config.render_options),
            allocator: AtlasAllocator::new(&config.atlas, shelf_height, padding),
            config,
            rasterizer,
            font,
            directory: GlyphDirectory::new(),
            pipeline: PopulationPipeline::new(),
            compiler: BatchCompiler::new(),
            staging: StagingBuffer::new(),
        })
    }

    // ---------------------------------------------------------------------------
    // Frame lifecycle
    // ---------------------------------------------------------------------------

    /// Starts a frame: rewinds the staging buffer and populates up to
    /// [`glyphs_per_frame`](RendererConfig::glyphs_per_frame) queued glyphs.
    pub fn tick<B: TextureBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<PopulateReport, Error> {
        self.staging.clear();
        self.drain_pending(self.config.glyphs_per_frame, backend)
    }

    /// Populates up to `max_count` queued glyphs without touching the staging buffer.
    pub fn drain_pending<B: TextureBackend + ?Sized>(
        &mut self,
        max_count: usize,
        backend: &mut B,
    ) -> Result<PopulateReport, Error> {
        self.pipeline.run(
            max_count,
            &mut self.rasterizer,
            &self.config.render_options,
            &mut self.metrics,
            &mut self.directory,
            &mut self.allocator,
            backend,
        )
    }

    /// Queues every glyph of `text` that is not in the atlas yet.
    pub fn request(&self, text: &str) {
        for token in MarkupScanner::new(text) {
            if let Token::Glyph { ch, .. } = token {
                self.directory.resolve(ch);
            }
        }
    }

    /// Returns the record for `ch`, queueing it if it is missing.
    pub fn resolve(&self, ch: char) -> Option<GlyphRecord> {
        self.directory.resolve(ch)
    }

    /// Returns the record for `ch` without queueing it.
    pub fn glyph(&self, ch: char) -> Option<&GlyphRecord> {
        self.directory.get(ch)
    }

    /// A handle for requesting glyphs from other threads.
    pub fn pending_queue(&self) -> Arc<PendingQueue> {
        Arc::clone(self.directory.queue())
    }

    /// Drops every glyph and destroys every texture. The renderer then behaves like a
    /// freshly created one.
    pub fn reset<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        log::debug!(
            "resetting glyph atlas ({} glyphs, {} pages)",
            self.directory.len(),
            self.allocator.page_count()
        );
        self.directory.clear();
        self.metrics.forget_placeholders();
        self.allocator.reset(backend);
        self.staging.clear();
    }

    // ---------------------------------------------------------------------------
    // Drawing
    // ---------------------------------------------------------------------------

    /// Draws `text` with its top-left corner at `(x, y)`.
    ///
    /// Color errors are reported before anything is written.
    pub fn draw_string<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &TextStyle<'_>,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        BatchCompiler::validate(text, &style.fill)?;
        let gradient_span = match style.fill {
            TextFill::Gradient(colors) => {
                #[allow(
                    clippy::cast_precision_loss,
                    reason = "stop counts are small"
                )]
                let gaps = (colors.len() - 1) as f32;
                self.raw_width(text, 1.0) / gaps
            }
            _ => 0.0,
        };
        #[allow(
            clippy::cast_precision_loss,
            reason = "line heights are small integers"
        )]
        let params = WalkParams {
            line_height: self.font.line_height as f32,
            gradient_span,
            shadow_color: self.config.shadow_color,
        };
        let skipped = self.compiler.walk(text, style, &params, &self.directory);
        let glyphs = self.compiler.quad_count();
        let transform = Affine::translate((f64::from(x), f64::from(y)))
            * Affine::scale(f64::from(style.scale * self.config.general_scale));
        let draw_calls = self.compiler.submit(
            &mut self.staging,
            self.config.batch_method,
            &self.allocator,
            transform,
            submitter,
        );
        Ok(BatchSummary {
            glyphs,
            skipped,
            draw_calls,
        })
    }

    fn draw_with_shadow<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &TextStyle<'_>,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let offset = self.config.shadow_depth * style.scale * self.config.general_scale;
        let shadow = style.shadowed();
        let first = self.draw_string(text, x + offset, y + offset, &shadow, submitter)?;
        let second = self.draw_string(text, x, y, style, submitter)?;
        Ok(first + second)
    }

    fn centered_x(&mut self, text: &str, x: f32, scale: f32) -> f32 {
        x - self.get_width(text, scale) / 2.0
    }

    /// Draws `text` in `color`, with markup.
    pub fn draw_plain_string<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let style = TextStyle::new(color).with_scale(scale);
        self.draw_string(text, x, y, &style, submitter)
    }

    /// Draws `text` over a copy offset by the shadow depth in the shadow color.
    pub fn draw_string_with_shadow<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let style = TextStyle::new(color).with_scale(scale);
        self.draw_with_shadow(text, x, y, &style, submitter)
    }

    /// Draws `text` horizontally centered on `x`.
    pub fn draw_centered_string<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let x = self.centered_x(text, x, scale);
        self.draw_plain_string(text, x, y, color, scale, submitter)
    }

    /// Draws `text` centered on `x`, with a shadow.
    pub fn draw_centered_string_with_shadow<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let x = self.centered_x(text, x, scale);
        self.draw_string_with_shadow(text, x, y, color, scale, submitter)
    }

    /// Draws `text` with a horizontal gradient across `colors`.
    pub fn draw_gradient_string<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        colors: &[Color],
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let style = TextStyle::gradient(colors).with_scale(scale);
        self.draw_string(text, x, y, &style, submitter)
    }

    /// Draws gradient text with a shadow.
    pub fn draw_gradient_string_with_shadow<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        colors: &[Color],
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let style = TextStyle::gradient(colors).with_scale(scale);
        self.draw_with_shadow(text, x, y, &style, submitter)
    }

    /// Draws gradient text centered on `x`.
    pub fn draw_centered_gradient_string<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        colors: &[Color],
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let x = self.centered_x(text, x, scale);
        self.draw_gradient_string(text, x, y, colors, scale, submitter)
    }

    /// Draws gradient text centered on `x`, with a shadow.
    pub fn draw_centered_gradient_string_with_shadow<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        colors: &[Color],
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let x = self.centered_x(text, x, scale);
        self.draw_gradient_string_with_shadow(text, x, y, colors, scale, submitter)
    }

    /// Draws `text` with one color per character boundary.
    pub fn draw_sliced_string<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        colors: &[Color],
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let style = TextStyle::sliced(colors).with_scale(scale);
        self.draw_string(text, x, y, &style, submitter)
    }

    /// Draws sliced text with a shadow.
    pub fn draw_sliced_string_with_shadow<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        colors: &[Color],
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let style = TextStyle::sliced(colors).with_scale(scale);
        self.draw_with_shadow(text, x, y, &style, submitter)
    }

    /// Draws sliced text centered on `x`.
    pub fn draw_centered_sliced_string<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        colors: &[Color],
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let x = self.centered_x(text, x, scale);
        self.draw_sliced_string(text, x, y, colors, scale, submitter)
    }

    /// Draws sliced text centered on `x`, with a shadow.
    pub fn draw_centered_sliced_string_with_shadow<S: DrawSubmitter + ?Sized>(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        colors: &[Color],
        scale: f32,
        submitter: &mut S,
    ) -> Result<BatchSummary, Error> {
        let x = self.centered_x(text, x, scale);
        self.draw_sliced_string_with_shadow(text, x, y, colors, scale, submitter)
    }

    // ---------------------------------------------------------------------------
    // Measurement
    // ---------------------------------------------------------------------------

    /// Advance of `ch` at `scale`, including the general scale.
    pub fn get_char_width(&mut self, ch: char, scale: f32) -> f32 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "glyph widths are small integers"
        )]
        let width = self.metrics.width(ch, &mut self.rasterizer) as f32;
        width * scale * self.config.general_scale
    }

    /// Width of `text` at `scale`, including the general scale. Markup takes no space.
    pub fn get_width(&mut self, text: &str, scale: f32) -> f32 {
        self.raw_width(text, scale) * self.config.general_scale
    }

    /// Sum of the advances of `text` at `scale`, without the general scale.
    ///
    /// Markup codes and line breaks contribute nothing.
    pub fn raw_width(&mut self, text: &str, scale: f32) -> f32 {
        let mut total = 0_i64;
        for token in MarkupScanner::new(text) {
            if let Token::Glyph { ch, .. } = token {
                total += i64::from(self.metrics.width(ch, &mut self.rasterizer));
            }
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "string widths are far below 2^24"
        )]
        let total = total as f32;
        total * scale
    }

    /// Line height at `scale`, including the general scale.
    pub fn get_height(&self, scale: f32) -> f32 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "line heights are small integers"
        )]
        let height = self.font.line_height as f32;
        height * scale * self.config.general_scale
    }

    // ---------------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------------

    /// Occupancy counters.
    pub fn stats(&self) -> AtlasStats {
        AtlasStats {
            glyphs: self.directory.len(),
            failed: self
                .directory
                .iter()
                .filter(|(_, record)| record.cell.is_none())
                .count(),
            pending: self.directory.queue().len(),
            pages: self.allocator.page_count(),
            shelves: self.allocator.packer().shelves_used(),
            committed_tiles: self.allocator.committed_tiles(),
            staging_bytes: self.staging.len(),
        }
    }

    /// Lifecycle state of `page`.
    pub fn page_state(&self, page: u32) -> PageState {
        self.allocator.state(page)
    }

    /// The allocator, for page bindings and packing details.
    pub fn allocator(&self) -> &AtlasAllocator {
        &self.allocator
    }

    /// The published glyph records.
    pub fn directory(&self) -> &GlyphDirectory {
        &self.directory
    }

    /// This frame's vertices.
    pub fn staging(&self) -> &StagingBuffer {
        &self.staging
    }

    /// The configuration the renderer was created with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Vertical metrics of the font.
    pub fn font_metrics(&self) -> &FontMetrics {
        &self.font
    }

    /// The rasterizer.
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// The rasterizer, mutably.
    pub fn rasterizer_mut(&mut self) -> &mut R {
        &mut self.rasterizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::CpuTextureBackend;
    use crate::batch::{DrawCall, MultiDrawCall};
    use crate::config::AtlasConfig;
    use crate::testing::{BlockRasterizer, LINE_HEIGHT};

    #[derive(Default)]
    struct CountingSubmitter {
        draws: Vec<(u32, u32)>,
    }

    impl DrawSubmitter for CountingSubmitter {
        fn draw(&mut self, call: &DrawCall<'_>) {
            self.draws.push((call.first_vertex, call.vertex_count));
        }

        fn multi_draw(&mut self, _call: &MultiDrawCall<'_>) {
            unreachable!("single page atlases never multi-draw");
        }
    }

    fn renderer() -> FontRenderer<BlockRasterizer> {
        let config = RendererConfig {
            atlas: AtlasConfig::default().with_page_size(256),
            ..RendererConfig::default()
        };
        FontRenderer::new(BlockRasterizer::new(10), config).unwrap()
    }

    #[test]
    fn first_draw_queues_second_draw_renders() {
        let mut renderer = renderer();
        let mut backend = CpuTextureBackend::new();
        let mut submitter = CountingSubmitter::default();
        let white = Color::from_rgba8(255, 255, 255, 255);

        let summary = renderer
            .draw_plain_string("hi", 0.0, 0.0, white, 1.0, &mut submitter)
            .unwrap();
        assert_eq!((summary.glyphs, summary.skipped), (0, 2));
        assert!(submitter.draws.is_empty());
        assert_eq!(renderer.stats().pending, 2);

        renderer.tick(&mut backend).unwrap();
        let summary = renderer
            .draw_plain_string("hi", 0.0, 0.0, white, 1.0, &mut submitter)
            .unwrap();
        assert_eq!(summary.glyphs, 2);
        assert_eq!(submitter.draws, [(0, 12)]);
    }

    #[test]
    fn measurement_ignores_markup() {
        let mut renderer = renderer();
        assert_eq!(renderer.raw_width("§cab&r", 1.0), 20.0);
        assert_eq!(renderer.raw_width("ab", 2.0), 40.0);
        assert_eq!(renderer.get_char_width('a', 1.5), 15.0);
        assert_eq!(renderer.get_height(1.0), LINE_HEIGHT as f32);
    }

    #[test]
    fn rejects_fonts_taller_than_a_page() {
        let config = RendererConfig {
            atlas: AtlasConfig::default().with_page_size(16),
            ..RendererConfig::default()
        };
        assert_eq!(
            FontRenderer::new(BlockRasterizer::new(10), config).unwrap_err(),
            Error::InvalidConfig("line height exceeds the atlas page size")
        );
    }
}
