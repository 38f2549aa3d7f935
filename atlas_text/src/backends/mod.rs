// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The GPU texture seam.
//!
//! The atlas talks to textures only through [`TextureBackend`]. A backend creates
//! textures, commits sparse regions, uploads sub-rectangles and destroys textures; it
//! never decides where anything goes.

mod cpu;

pub use cpu::{CpuTexture, CpuTextureBackend};

/// Opaque handle to a texture owned by a [`TextureBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Pixel format of atlas textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    /// 8-bit RGBA, not premultiplied. Glyph pixels are white with coverage in alpha.
    Rgba8,
}

impl TextureFormat {
    /// Size of one pixel in bytes.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
        }
    }
}

/// Shape of a texture to create.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Pixel format.
    pub format: TextureFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of array layers; 1 for plain 2D textures.
    pub layers: u32,
    /// Whether memory is committed explicitly through
    /// [`TextureBackend::commit_region`].
    pub sparse: bool,
}

/// Destination of a sub-image upload.
///
/// The source pixels start at the first pixel of the region. Consecutive rows are
/// `row_length` pixels apart, which lets a region be uploaded straight out of a wider
/// scratch image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadRegion {
    /// Array layer to write.
    pub layer: u32,
    /// Left edge, in pixels.
    pub x: u32,
    /// Top edge, in pixels.
    pub y: u32,
    /// Width, in pixels.
    pub width: u32,
    /// Height, in pixels.
    pub height: u32,
    /// Distance between the starts of consecutive source rows, in pixels.
    pub row_length: u32,
}

impl UploadRegion {
    /// Number of source bytes the upload reads for `format`.
    pub fn source_len(&self, format: TextureFormat) -> usize {
        if self.width == 0 || self.height == 0 {
            return 0;
        }
        let bpp = format.bytes_per_pixel();
        let rows = self.height as usize - 1;
        (rows * self.row_length as usize + self.width as usize) * bpp
    }
}

/// Where a page lives: the texture and array layer that back it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageBinding {
    /// Atlas page index.
    pub page: u32,
    /// Texture backing the page.
    pub texture: TextureHandle,
    /// Array layer within `texture`. 0 unless the store is layered.
    pub layer: u32,
}

/// Creates, fills and destroys atlas textures.
///
/// All calls happen on the render thread.
pub trait TextureBackend {
    /// Creates a texture. Texel contents are undefined until uploaded.
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureHandle;

    /// Makes memory resident for a region of a sparse texture.
    ///
    /// Uploads to a sparse texture only target committed regions.
    fn commit_region(&mut self, texture: TextureHandle, x: u32, y: u32, width: u32, height: u32);

    /// Copies `pixels` into `region` of `texture`.
    fn upload_region(&mut self, texture: TextureHandle, region: &UploadRegion, pixels: &[u8]);

    /// Releases a texture. The handle is invalid afterwards.
    fn destroy_texture(&mut self, texture: TextureHandle);
}

impl<B: TextureBackend + ?Sized> TextureBackend for &mut B {
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureHandle {
        (**self).create_texture(descriptor)
    }

    fn commit_region(&mut self, texture: TextureHandle, x: u32, y: u32, width: u32, height: u32) {
        (**self).commit_region(texture, x, y, width, height);
    }

    fn upload_region(&mut self, texture: TextureHandle, region: &UploadRegion, pixels: &[u8]) {
        (**self).upload_region(texture, region, pixels);
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        (**self).destroy_texture(texture);
    }
}
