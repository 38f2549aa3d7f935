// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph atlas: codepoint lookup, cell packing and page storage.
//!
//! - [`GlyphDirectory`]: published [`GlyphRecord`]s and the [`PendingQueue`] of misses
//! - [`ShelfPacker`]: forward-only placement of cells into pages
//! - [`AtlasAllocator`]: page lifecycle and uploads through a [`BackingStoreStrategy`]
//! - [`AtlasCommandRecorder`]: deferred texture commands, replayed by [`AtlasReplayer`]

mod commands;
mod directory;
mod packer;
mod queue;
mod region;
mod store;

pub use commands::{AtlasCommand, AtlasCommandRecorder, AtlasReplayer};
pub use directory::GlyphDirectory;
pub use packer::{Placement, ShelfPacker};
pub use queue::PendingQueue;
pub use region::{GlyphRecord, PixelRect, UvRect};
pub use store::{AtlasAllocator, BackingStoreStrategy, PageState};
