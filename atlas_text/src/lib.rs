// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas Text packs rasterized glyphs into GPU texture pages on demand and compiles
//! styled strings into batched draw calls.
//!
//! The crate is built around a single [`FontRenderer`] per font instance:
//!
//! - Glyphs are rasterized lazily. A draw that references a glyph which is not yet in
//!   the atlas skips it and queues it; the host render loop calls
//!   [`FontRenderer::tick`] once per frame to populate a bounded number of queued glyphs.
//! - Rasterized glyphs are shelf-packed into fixed-size pages. The page storage strategy
//!   ([`StoreKind`]) is chosen once: a layered texture, an unbounded set of 2D pages, or
//!   a single sparse texture whose tiles are committed on first use.
//! - [`FontRenderer::draw_string`] walks a string with inline color markup
//!   (`§c`, `&a`, `§r`, ...), emits one quad per glyph into a shared
//!   [`StagingBuffer`] and hands page-grouped draw calls to a [`DrawSubmitter`].
//!
//! Rasterization, GPU textures and draw submission are external collaborators, expressed
//! as the [`GlyphRasterizer`], [`TextureBackend`] and [`DrawSubmitter`] traits.
//!
//! ## Features
//!
//! - `swash`: Implements [`GlyphRasterizer`] over a font blob using [swash].
//! - `png`: Enables writing the pages of a [`CpuTextureBackend`] to PNG files.
//!
//! [swash]: https://docs.rs/swash

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use peniko::{color, kurbo};

mod color_ext;
mod config;
mod error;
mod math;
mod metrics;
mod renderer;

pub mod atlas;
pub mod backends;
pub mod batch;
pub mod markup;
pub mod pipeline;
pub mod rasterizer;

#[cfg(test)]
mod testing;

pub use color_ext::{Color, PALETTE};
pub use config::{
    AtlasConfig, BatchMethod, RendererConfig, StoreKind, DEFAULT_GLYPHS_PER_FRAME,
    DEFAULT_PAGE_SIZE, DEFAULT_SPARSE_PAGE_SIZE, DEFAULT_TEXTURE_SLICES, MAX_TEXTURE_SLICES,
};
pub use error::{Error, RasterError};
pub use metrics::MetricsCache;
pub use renderer::{AtlasStats, FontRenderer};

pub use atlas::{
    AtlasAllocator, AtlasCommand, AtlasCommandRecorder, AtlasReplayer, GlyphDirectory,
    GlyphRecord, PageState, PendingQueue, PixelRect, UvRect,
};
pub use backends::{
    CpuTextureBackend, PageBinding, TextureBackend, TextureDescriptor, TextureFormat,
    TextureHandle, UploadRegion,
};
pub use batch::{
    BatchSummary, DrawCall, DrawSubmitter, GlyphVertex, MultiDrawCall, StagingBuffer,
    StagingRange, TextFill, TextStyle, Topology,
};
pub use pipeline::PopulateReport;
pub use rasterizer::{FontMetrics, GlyphBitmap, GlyphRasterizer, RasterizedGlyph, RenderOptions};

#[cfg(feature = "swash")]
pub use rasterizer::swash::SwashRasterizer;
