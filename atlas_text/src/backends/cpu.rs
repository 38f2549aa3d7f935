// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A texture backend that keeps pages in system memory.
//!
//! Used by tests and for offline inspection of atlas contents. Sparse textures are
//! checked strictly: an upload that touches an uncommitted pixel is rejected.

use hashbrown::HashMap;

use super::{TextureBackend, TextureDescriptor, TextureHandle, UploadRegion};
use crate::atlas::PixelRect;

/// A texture held by a [`CpuTextureBackend`].
#[derive(Clone, Debug)]
pub struct CpuTexture {
    descriptor: TextureDescriptor,
    // Allocated on first upload so large sparse textures cost nothing up front.
    layers: Vec<Option<Vec<u8>>>,
    committed: Vec<PixelRect>,
}

impl CpuTexture {
    fn new(descriptor: TextureDescriptor) -> Self {
        Self {
            descriptor,
            layers: vec![None; descriptor.layers.max(1) as usize],
            committed: Vec::new(),
        }
    }

    /// The descriptor the texture was created with.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Regions committed so far, in commit order.
    pub fn committed_regions(&self) -> &[PixelRect] {
        &self.committed
    }

    /// Whether the pixel is backed by memory. Always true for non-sparse textures.
    pub fn is_committed(&self, x: u32, y: u32) -> bool {
        !self.descriptor.sparse || self.committed.iter().any(|rect| rect.contains(x, y))
    }

    /// RGBA bytes of a layer, or `None` if nothing was uploaded to it yet.
    pub fn layer_data(&self, layer: u32) -> Option<&[u8]> {
        self.layers.get(layer as usize)?.as_deref()
    }

    /// The RGBA value of one pixel. Unwritten pixels read as transparent black.
    pub fn pixel(&self, layer: u32, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.descriptor.width || y >= self.descriptor.height {
            return None;
        }
        let Some(data) = self.layers.get(layer as usize)? else {
            return Some([0; 4]);
        };
        let offset = (y as usize * self.descriptor.width as usize + x as usize) * 4;
        let pixel = data.get(offset..offset + 4)?;
        Some([pixel[0], pixel[1], pixel[2], pixel[3]])
    }

    fn region_committed(&self, region: &UploadRegion) -> bool {
        (region.y..region.y + region.height)
            .all(|y| (region.x..region.x + region.width).all(|x| self.is_committed(x, y)))
    }
}

/// A [`TextureBackend`] storing textures as byte vectors.
#[derive(Debug, Default)]
pub struct CpuTextureBackend {
    textures: HashMap<TextureHandle, CpuTexture>,
    next_handle: u32,
    uploads: usize,
    rejected_uploads: usize,
    destroyed: usize,
}

impl CpuTextureBackend {
    /// Creates a backend with no textures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a live texture.
    pub fn texture(&self, handle: TextureHandle) -> Option<&CpuTexture> {
        self.textures.get(&handle)
    }

    /// Number of textures created and not yet destroyed.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Number of textures destroyed so far.
    pub fn destroyed_textures(&self) -> usize {
        self.destroyed
    }

    /// Number of accepted uploads.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Number of uploads dropped because they were out of bounds, short of data or
    /// targeted uncommitted sparse memory.
    pub fn rejected_uploads(&self) -> usize {
        self.rejected_uploads
    }

    /// Shorthand for reading one pixel of a texture.
    pub fn pixel(&self, handle: TextureHandle, layer: u32, x: u32, y: u32) -> Option<[u8; 4]> {
        self.texture(handle)?.pixel(layer, x, y)
    }

    /// Writes one layer of a texture to a PNG file.
    #[cfg(feature = "png")]
    pub fn save_layer_png(
        &self,
        handle: TextureHandle,
        layer: u32,
        path: &std::path::Path,
    ) -> std::io::Result<()> {
        use std::fs::File;
        use std::io::BufWriter;

        let texture = self
            .texture(handle)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "unknown texture"))?;
        let TextureDescriptor { width, height, .. } = *texture.descriptor();
        let blank;
        let data = match texture.layer_data(layer) {
            Some(data) => data,
            None => {
                blank = vec![0_u8; width as usize * height as usize * 4];
                &blank
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let w = BufWriter::new(file);

        let mut encoder = png::Encoder::new(w, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(std::io::Error::other)?;
        writer.write_image_data(data).map_err(std::io::Error::other)?;

        Ok(())
    }
}

impl TextureBackend for CpuTextureBackend {
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureHandle {
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        self.textures.insert(handle, CpuTexture::new(*descriptor));
        handle
    }

    fn commit_region(&mut self, texture: TextureHandle, x: u32, y: u32, width: u32, height: u32) {
        match self.textures.get_mut(&texture) {
            Some(texture) => texture.committed.push(PixelRect::new(x, y, width, height)),
            None => log::warn!("commit to unknown texture {texture:?}"),
        }
    }

    fn upload_region(&mut self, texture: TextureHandle, region: &UploadRegion, pixels: &[u8]) {
        let Some(target) = self.textures.get_mut(&texture) else {
            log::warn!("upload to unknown texture {texture:?}");
            self.rejected_uploads += 1;
            return;
        };
        let descriptor = target.descriptor;
        let in_bounds = region.layer < descriptor.layers.max(1)
            && region.x + region.width <= descriptor.width
            && region.y + region.height <= descriptor.height
            && region.width <= region.row_length;
        if !in_bounds || pixels.len() < region.source_len(descriptor.format) {
            log::warn!("rejected malformed upload {region:?} to {texture:?}");
            self.rejected_uploads += 1;
            return;
        }
        if !target.region_committed(region) {
            log::warn!("rejected upload {region:?} to uncommitted memory of {texture:?}");
            self.rejected_uploads += 1;
            return;
        }

        let stride = descriptor.width as usize * 4;
        let data = target.layers[region.layer as usize]
            .get_or_insert_with(|| vec![0; stride * descriptor.height as usize]);
        let row_bytes = region.width as usize * 4;
        let src_stride = region.row_length as usize * 4;
        for row in 0..region.height as usize {
            let src = &pixels[row * src_stride..row * src_stride + row_bytes];
            let dst_start = (region.y as usize + row) * stride + region.x as usize * 4;
            data[dst_start..dst_start + row_bytes].copy_from_slice(src);
        }
        self.uploads += 1;
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_some() {
            self.destroyed += 1;
        }
    }
}
