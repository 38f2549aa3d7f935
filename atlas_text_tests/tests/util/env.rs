// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A renderer wired to a CPU texture backend and a recording submitter.

use atlas_text::{
    AtlasConfig, CpuTextureBackend, FontRenderer, GlyphRecord, PopulateReport, RendererConfig,
};

use super::{ProportionalRasterizer, RecordingSubmitter};

pub(crate) struct TestEnv {
    pub(crate) renderer: FontRenderer<ProportionalRasterizer>,
    pub(crate) backend: CpuTextureBackend,
    pub(crate) submitter: RecordingSubmitter,
}

impl TestEnv {
    /// A multi-page atlas with 512px pages.
    pub(crate) fn new() -> Self {
        Self::with_atlas(AtlasConfig::default().with_page_size(512))
    }

    pub(crate) fn with_atlas(atlas: AtlasConfig) -> Self {
        Self::with_config(RendererConfig {
            atlas,
            ..RendererConfig::default()
        })
    }

    pub(crate) fn with_config(config: RendererConfig) -> Self {
        Self::with_rasterizer(ProportionalRasterizer::new(), config)
    }

    pub(crate) fn with_rasterizer(
        rasterizer: ProportionalRasterizer,
        config: RendererConfig,
    ) -> Self {
        Self {
            renderer: FontRenderer::new(rasterizer, config)
                .expect("test configurations are valid"),
            backend: CpuTextureBackend::new(),
            submitter: RecordingSubmitter::new(),
        }
    }

    /// Requests every glyph of `text` and populates all of them at once.
    pub(crate) fn warm(&mut self, text: &str) -> PopulateReport {
        self.renderer.request(text);
        self.renderer
            .drain_pending(usize::MAX, &mut self.backend)
            .expect("the atlas has room")
    }

    /// Starts a new frame and forgets the calls of the previous one.
    pub(crate) fn tick(&mut self) -> PopulateReport {
        self.submitter.clear();
        self.renderer
            .tick(&mut self.backend)
            .expect("the atlas has room")
    }

    /// The published record of `ch`.
    pub(crate) fn record(&self, ch: char) -> GlyphRecord {
        *self
            .renderer
            .glyph(ch)
            .unwrap_or_else(|| panic!("{ch:?} has not been populated"))
    }

    /// RGBA of a pixel of `page`.
    pub(crate) fn pixel(&self, page: u32, x: u32, y: u32) -> [u8; 4] {
        let binding = self
            .renderer
            .allocator()
            .binding(page)
            .expect("page has a texture");
        self.backend
            .pixel(binding.texture, binding.layer, x, y)
            .expect("pixel is inside the page")
    }
}
