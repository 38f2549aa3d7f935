// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page storage strategies and the allocator built on top of them.

use smallvec::SmallVec;

use super::packer::{PackError, Placement, ShelfPacker};
use super::region::PixelRect;
use crate::backends::{
    PageBinding, TextureBackend, TextureDescriptor, TextureFormat, TextureHandle, UploadRegion,
};
use crate::config::{AtlasConfig, StoreKind};
use crate::error::Error;

/// Lifecycle of an atlas page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageState {
    /// No texture memory exists for the page yet.
    #[default]
    Unallocated,
    /// Texture memory exists but nothing has been uploaded.
    Created,
    /// At least one glyph has been uploaded and the packer can still place cells here.
    Populated,
    /// The packer has moved past this page.
    Full,
}

/// How pages map onto textures.
#[derive(Clone, Debug)]
pub enum BackingStoreStrategy {
    /// One array texture; page `n` is layer `n`.
    Layered {
        /// The array texture, once created.
        texture: Option<TextureHandle>,
        /// Number of layers.
        layers: u32,
    },
    /// One 2D texture per page.
    MultiPage {
        /// Texture of page `n` at index `n`.
        textures: Vec<TextureHandle>,
    },
    /// A single sparse 2D texture, committed tile by tile.
    SparseVirtual {
        /// The sparse texture, once created.
        texture: Option<TextureHandle>,
        /// Tiles along each axis.
        slices: u32,
        /// Row-major commit flags, `slices * slices` entries.
        committed: Vec<bool>,
    },
}

impl BackingStoreStrategy {
    fn new(kind: StoreKind) -> Self {
        match kind {
            StoreKind::Layered { layers } => Self::Layered {
                texture: None,
                layers,
            },
            StoreKind::MultiPage => Self::MultiPage {
                textures: Vec::new(),
            },
            StoreKind::SparseVirtual { texture_slices } => Self::SparseVirtual {
                texture: None,
                slices: texture_slices,
                committed: vec![false; tile_count(texture_slices)],
            },
        }
    }

    fn binding(&self, page: u32) -> Option<PageBinding> {
        let (texture, layer) = match self {
            Self::Layered { texture, layers } => {
                if page >= *layers {
                    return None;
                }
                ((*texture)?, page)
            }
            Self::MultiPage { textures } => (*textures.get(page as usize)?, 0),
            Self::SparseVirtual { texture, .. } => {
                if page != 0 {
                    return None;
                }
                ((*texture)?, 0)
            }
        };
        Some(PageBinding {
            page,
            texture,
            layer,
        })
    }

    fn ensure<B: TextureBackend + ?Sized>(
        &mut self,
        page: u32,
        page_size: u32,
        backend: &mut B,
    ) -> PageBinding {
        let mut descriptor = TextureDescriptor {
            format: TextureFormat::Rgba8,
            width: page_size,
            height: page_size,
            layers: 1,
            sparse: false,
        };
        match self {
            Self::Layered { texture, layers } => {
                let texture = *texture.get_or_insert_with(|| {
                    descriptor.layers = *layers;
                    log::debug!("creating {layers}-layer glyph atlas of {page_size}x{page_size}");
                    backend.create_texture(&descriptor)
                });
                PageBinding {
                    page,
                    texture,
                    layer: page,
                }
            }
            Self::MultiPage { textures } => {
                while textures.len() <= page as usize {
                    log::debug!(
                        "creating glyph atlas page {} of {page_size}x{page_size}",
                        textures.len()
                    );
                    textures.push(backend.create_texture(&descriptor));
                }
                PageBinding {
                    page,
                    texture: textures[page as usize],
                    layer: 0,
                }
            }
            Self::SparseVirtual { texture, .. } => {
                let texture = *texture.get_or_insert_with(|| {
                    descriptor.sparse = true;
                    log::debug!("creating sparse glyph atlas of {page_size}x{page_size}");
                    backend.create_texture(&descriptor)
                });
                PageBinding {
                    page,
                    texture,
                    layer: 0,
                }
            }
        }
    }

    /// Commits every sparse tile touched by `rect`. A no-op for non-sparse stores.
    fn commit<B: TextureBackend + ?Sized>(
        &mut self,
        rect: PixelRect,
        page_size: u32,
        backend: &mut B,
    ) {
        let Self::SparseVirtual {
            texture: Some(texture),
            slices,
            committed,
        } = self
        else {
            return;
        };
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let slices = *slices;
        let tile = |px: u32| tile_index(px, slices, page_size);
        let first_x = tile(rect.x).min(slices - 1);
        let last_x = tile(rect.right() - 1).min(slices - 1);
        let first_y = tile(rect.y).min(slices - 1);
        let last_y = tile(rect.bottom() - 1).min(slices - 1);
        for ty in first_y..=last_y {
            for tx in first_x..=last_x {
                let flag = &mut committed[tile_slot(tx, ty, slices)];
                if *flag {
                    continue;
                }
                *flag = true;
                let (x0, y0) = (tile_edge(tx, slices, page_size), tile_edge(ty, slices, page_size));
                let (x1, y1) = (
                    tile_edge(tx + 1, slices, page_size),
                    tile_edge(ty + 1, slices, page_size),
                );
                log::trace!("committing sparse tile ({tx}, {ty})");
                backend.commit_region(*texture, x0, y0, x1 - x0, y1 - y0);
            }
        }
    }

    fn destroy<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        match self {
            Self::Layered { texture, .. } => {
                if let Some(texture) = texture.take() {
                    backend.destroy_texture(texture);
                }
            }
            Self::MultiPage { textures } => {
                for texture in textures.drain(..) {
                    backend.destroy_texture(texture);
                }
            }
            Self::SparseVirtual {
                texture, committed, ..
            } => {
                if let Some(texture) = texture.take() {
                    backend.destroy_texture(texture);
                }
                committed.fill(false);
            }
        }
    }
}

/// Number of commit flags of a sparse store.
fn tile_count(slices: u32) -> usize {
    slices as usize * slices as usize
}

/// Row-major index of tile `(tx, ty)`.
fn tile_slot(tx: u32, ty: u32, slices: u32) -> usize {
    ty as usize * slices as usize + tx as usize
}

/// Tile containing pixel `px` along one axis.
fn tile_index(px: u32, slices: u32, page_size: u32) -> u32 {
    let tile = u64::from(slices) * u64::from(px) / u64::from(page_size);
    u32::try_from(tile).unwrap_or(u32::MAX)
}

/// First pixel of tile `index`, so that tiles exactly partition the page.
fn tile_edge(index: u32, slices: u32, page_size: u32) -> u32 {
    // Smallest px with tile_index(px) >= index.
    let edge = (u64::from(index) * u64::from(page_size)).div_ceil(u64::from(slices));
    u32::try_from(edge).unwrap_or(u32::MAX)
}

/// Places glyph cells and moves their pixels into page textures.
#[derive(Clone, Debug)]
pub struct AtlasAllocator {
    kind: StoreKind,
    page_size: u32,
    padding: u32,
    packer: ShelfPacker,
    strategy: BackingStoreStrategy,
    pages: SmallVec<[PageState; 4]>,
}

impl AtlasAllocator {
    /// Creates an allocator whose shelves are `shelf_height` pixels tall and whose cells
    /// carry `padding` pixels on each side.
    pub fn new(config: &AtlasConfig, shelf_height: u32, padding: u32) -> Self {
        Self {
            kind: config.store,
            page_size: config.page_size,
            padding,
            packer: ShelfPacker::new(config.page_size, shelf_height, config.store.max_pages()),
            strategy: BackingStoreStrategy::new(config.store),
            pages: SmallVec::new(),
        }
    }

    /// Reserves a cell `width` pixels wide, padding included.
    ///
    /// Returns `Ok(None)` if the cell can never fit because it is wider than a page.
    pub fn place(&mut self, width: u32) -> Result<Option<Placement>, Error> {
        match self.packer.place(width) {
            Ok(placement) => {
                if placement.new_page && placement.page > 0 {
                    self.set_state(placement.page - 1, PageState::Full);
                }
                Ok(Some(placement))
            }
            Err(PackError::TooWide) => Ok(None),
            Err(PackError::Exhausted) => {
                let page = self.packer.page();
                self.set_state(page, PageState::Full);
                Err(Error::CapacityExhausted {
                    store: self.kind,
                    pages: page + 1,
                    page_size: self.page_size,
                })
            }
        }
    }

    /// Makes sure memory backs `rect` of `page`: creates the page's texture if needed and,
    /// for sparse stores, commits the touched tiles.
    pub fn commit<B: TextureBackend + ?Sized>(
        &mut self,
        page: u32,
        rect: PixelRect,
        backend: &mut B,
    ) -> PageBinding {
        let binding = self.strategy.ensure(page, self.page_size, backend);
        if self.state(page) == PageState::Unallocated {
            self.set_state(page, PageState::Created);
        }
        self.strategy.commit(rect, self.page_size, backend);
        binding
    }

    /// Uploads `rect` of `page` from `pixels`, whose rows are `row_length` pixels apart.
    pub fn upload<B: TextureBackend + ?Sized>(
        &mut self,
        page: u32,
        rect: PixelRect,
        pixels: &[u8],
        row_length: u32,
        backend: &mut B,
    ) {
        let binding = self.commit(page, rect, backend);
        let region = UploadRegion {
            layer: binding.layer,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            row_length,
        };
        log::trace!("uploading {region:?} to page {page}");
        backend.upload_region(binding.texture, &region, pixels);
        if self.state(page) == PageState::Created {
            self.set_state(page, PageState::Populated);
        }
    }

    /// The texture and layer backing `page`, if it has been created.
    pub fn binding(&self, page: u32) -> Option<PageBinding> {
        self.strategy.binding(page)
    }

    /// The lifecycle state of `page`.
    pub fn state(&self, page: u32) -> PageState {
        self.pages.get(page as usize).copied().unwrap_or_default()
    }

    fn set_state(&mut self, page: u32, state: PageState) {
        let index = page as usize;
        if self.pages.len() <= index {
            self.pages.resize(index + 1, PageState::Unallocated);
        }
        self.pages[index] = state;
    }

    /// Number of pages with texture memory.
    pub fn page_count(&self) -> u32 {
        let count = self
            .pages
            .iter()
            .filter(|state| **state != PageState::Unallocated)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Number of committed sparse tiles. Always 0 for non-sparse stores.
    pub fn committed_tiles(&self) -> usize {
        match &self.strategy {
            BackingStoreStrategy::SparseVirtual { committed, .. } => {
                committed.iter().filter(|flag| **flag).count()
            }
            _ => 0,
        }
    }

    /// Whether the sparse tile at `(tx, ty)` is committed. Always true for non-sparse stores.
    pub fn is_tile_committed(&self, tx: u32, ty: u32) -> bool {
        match &self.strategy {
            BackingStoreStrategy::SparseVirtual {
                slices, committed, ..
            } => tx < *slices && ty < *slices && committed[tile_slot(tx, ty, *slices)],
            _ => true,
        }
    }

    /// The backing strategy.
    pub fn strategy(&self) -> &BackingStoreStrategy {
        &self.strategy
    }

    /// The packer cursor.
    pub fn packer(&self) -> &ShelfPacker {
        &self.packer
    }

    /// Edge length of a page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Padding on each side of a cell.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Destroys all textures and rewinds the packer.
    pub fn reset<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        self.strategy.destroy(backend);
        self.packer.reset();
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::CpuTextureBackend;

    fn sparse(page_size: u32, slices: u32) -> AtlasConfig {
        AtlasConfig {
            page_size,
            store: StoreKind::SparseVirtual {
                texture_slices: slices,
            },
            ..AtlasConfig::default()
        }
    }

    #[test]
    fn tiles_partition_page() {
        let mut end = 0;
        for index in 0..3 {
            let start = tile_edge(index, 3, 100);
            assert_eq!(start, end);
            end = tile_edge(index + 1, 3, 100);
        }
        assert_eq!(end, 100);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn tile_slots_do_not_overflow() {
        assert_eq!(tile_count(65_536), 1 << 32);
        assert_eq!(tile_slot(65_535, 65_535, 65_536), (1 << 32) - 1);
    }

    #[test]
    fn sparse_commit_covers_touched_tiles_only() {
        let mut backend = CpuTextureBackend::new();
        let mut allocator = AtlasAllocator::new(&sparse(512, 8), 20, 1);
        // Crosses the boundary between tiles 0 and 1 horizontally, inside tile row 0.
        allocator.commit(0, PixelRect::new(60, 0, 10, 20), &mut backend);
        assert_eq!(allocator.committed_tiles(), 2);
        assert!(allocator.is_tile_committed(0, 0));
        assert!(allocator.is_tile_committed(1, 0));
        assert!(!allocator.is_tile_committed(0, 1));

        // Committing again is a no-op.
        allocator.commit(0, PixelRect::new(0, 0, 64, 64), &mut backend);
        assert_eq!(allocator.committed_tiles(), 2);
        let texture = allocator.binding(0).unwrap().texture;
        assert_eq!(
            backend.texture(texture).unwrap().committed_regions().len(),
            2
        );
    }

    #[test]
    fn multi_page_creates_textures_lazily() {
        let mut backend = CpuTextureBackend::new();
        let config = AtlasConfig::default().with_page_size(64);
        let mut allocator = AtlasAllocator::new(&config, 32, 0);
        assert_eq!(allocator.page_count(), 0);
        assert!(allocator.binding(0).is_none());

        allocator.commit(0, PixelRect::new(0, 0, 1, 1), &mut backend);
        assert_eq!(allocator.state(0), PageState::Created);
        allocator.upload(0, PixelRect::new(0, 0, 1, 1), &[0xFF; 4], 1, &mut backend);
        assert_eq!(allocator.state(0), PageState::Populated);
        assert_eq!(backend.live_textures(), 1);

        allocator.reset(&mut backend);
        assert_eq!(backend.live_textures(), 0);
        assert_eq!(allocator.page_count(), 0);
        assert_eq!(allocator.packer().cursor(), (0, 0));
    }

    #[test]
    fn layered_store_exhausts() {
        let config = AtlasConfig::layered(2).with_page_size(32);
        let mut allocator = AtlasAllocator::new(&config, 16, 0);
        for _ in 0..8 {
            allocator.place(16).unwrap();
        }
        assert_eq!(allocator.state(0), PageState::Full);
        let err = allocator.place(16).unwrap_err();
        assert_eq!(
            err,
            Error::CapacityExhausted {
                store: StoreKind::Layered { layers: 2 },
                pages: 2,
                page_size: 32,
            }
        );
        assert_eq!(allocator.state(1), PageState::Full);
    }
}
