// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas and renderer configuration.

use crate::color_ext::Color;
use crate::error::Error;
use crate::math::trunc_i32;
use crate::rasterizer::RenderOptions;

/// Default edge length of a 2D atlas page.
pub const DEFAULT_PAGE_SIZE: u32 = 4096;

/// Default edge length of the sparse virtual texture.
pub const DEFAULT_SPARSE_PAGE_SIZE: u32 = 8192;

/// Default number of commit tiles along each axis of the sparse virtual texture.
pub const DEFAULT_TEXTURE_SLICES: u32 = 16;

/// Largest number of commit tiles along each axis of the sparse virtual texture.
pub const MAX_TEXTURE_SLICES: u32 = 1024;

/// Default number of glyphs populated per [`FontRenderer::tick`](crate::FontRenderer::tick).
pub const DEFAULT_GLYPHS_PER_FRAME: usize = 16;

/// How atlas pages are backed by GPU textures.
///
/// The choice is fixed for the lifetime of a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// A single array texture with a fixed number of layers, one page per layer.
    ///
    /// Running out of layers is a capacity error.
    Layered {
        /// Number of layers (pages) in the array texture.
        layers: u32,
    },
    /// An unbounded list of independent 2D textures, created on demand.
    MultiPage,
    /// One large sparse texture. Only the tiles touched by uploads are committed.
    ///
    /// There is a single page; filling it is a capacity error.
    SparseVirtual {
        /// Number of commit tiles along each axis.
        texture_slices: u32,
    },
}

impl StoreKind {
    /// Maximum number of pages, or `None` if the store grows without bound.
    pub fn max_pages(self) -> Option<u32> {
        match self {
            Self::Layered { layers } => Some(layers),
            Self::MultiPage => None,
            Self::SparseVirtual { .. } => Some(1),
        }
    }
}

/// Geometry of the glyph atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasConfig {
    /// Edge length of a (square) page, in pixels.
    pub page_size: u32,
    /// Padding around each glyph at [`reference_size`](Self::reference_size).
    pub padding: u32,
    /// Point size at which `padding` applies unscaled.
    pub reference_size: f32,
    /// Page storage strategy.
    pub store: StoreKind,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            padding: 1,
            reference_size: 12.5,
            store: StoreKind::MultiPage,
        }
    }
}

impl AtlasConfig {
    /// A sparse virtual texture of the default size.
    pub fn sparse() -> Self {
        Self {
            page_size: DEFAULT_SPARSE_PAGE_SIZE,
            store: StoreKind::SparseVirtual {
                texture_slices: DEFAULT_TEXTURE_SLICES,
            },
            ..Self::default()
        }
    }

    /// A layered texture with `layers` pages of the default size.
    pub fn layered(layers: u32) -> Self {
        Self {
            store: StoreKind::Layered { layers },
            ..Self::default()
        }
    }

    /// Returns a copy with a different page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Padding for a font of `point_size`, truncated to whole pixels.
    pub fn scaled_padding(&self, point_size: f32) -> u32 {
        #[allow(clippy::cast_precision_loss, reason = "padding values are tiny")]
        let padding = self.padding as f32;
        u32::try_from(trunc_i32(padding * point_size / self.reference_size)).unwrap_or(0)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfig("page size must be non-zero"));
        }
        if self.reference_size.is_nan() || self.reference_size <= 0.0 {
            return Err(Error::InvalidConfig("reference size must be positive"));
        }
        match self.store {
            StoreKind::Layered { layers: 0 } => {
                Err(Error::InvalidConfig("layered store needs at least one layer"))
            }
            StoreKind::SparseVirtual { texture_slices } => {
                if texture_slices == 0 || texture_slices > self.page_size {
                    Err(Error::InvalidConfig(
                        "texture slices must be between 1 and the page size",
                    ))
                } else if texture_slices > MAX_TEXTURE_SLICES {
                    Err(Error::InvalidConfig("too many texture slices"))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

/// How multi-page strings are turned into draw calls.
///
/// Only relevant once the atlas spans more than one page; single-page atlases always
/// use one draw call per string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchMethod {
    /// Quads are grouped contiguously by page; one draw call per page.
    #[default]
    Sequential,
    /// Quads stay in string order; one multi-draw per page over the runs that use it.
    MultiDraw,
}

/// Configuration of a [`FontRenderer`](crate::FontRenderer).
#[derive(Clone, Copy, Debug)]
pub struct RendererConfig {
    /// Atlas geometry.
    pub atlas: AtlasConfig,
    /// Rasterization options.
    pub render_options: RenderOptions,
    /// Factor applied on top of every per-call scale.
    pub general_scale: f32,
    /// Glyphs populated per [`FontRenderer::tick`](crate::FontRenderer::tick).
    pub glyphs_per_frame: usize,
    /// Draw call strategy for multi-page atlases.
    pub batch_method: BatchMethod,
    /// Color used for the shadow pass of shadowed text.
    pub shadow_color: Color,
    /// Offset of the shadow pass, in unscaled pixels.
    pub shadow_depth: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            atlas: AtlasConfig::default(),
            render_options: RenderOptions::default(),
            general_scale: 1.0,
            glyphs_per_frame: DEFAULT_GLYPHS_PER_FRAME,
            batch_method: BatchMethod::default(),
            shadow_color: Color::from_rgba8(0, 0, 0, 160),
            shadow_depth: 1.0,
        }
    }
}

impl RendererConfig {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        self.atlas.validate()?;
        if !self.general_scale.is_finite() || self.general_scale <= 0.0 {
            return Err(Error::InvalidConfig("general scale must be positive"));
        }
        if self.glyphs_per_frame == 0 {
            return Err(Error::InvalidConfig("glyphs per frame must be non-zero"));
        }
        Ok(())
    }
}
