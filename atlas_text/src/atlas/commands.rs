// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred texture commands.
//!
//! Glyph population can run against an [`AtlasCommandRecorder`] instead of a live
//! backend. The recorder hands out its own texture handles and stores every call; the
//! application later replays the commands into the real backend with an
//! [`AtlasReplayer`], which maps recorded handles onto the backend's handles.
//!
//! Uploads are stored tightly packed, so replayed uploads always have
//! `row_length == width`.

use hashbrown::HashMap;

use crate::backends::{TextureBackend, TextureDescriptor, TextureHandle, UploadRegion};

/// A single recorded texture command.
///
/// The variants correspond 1:1 to the methods of [`TextureBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtlasCommand {
    /// Create a texture; later commands refer to it as `texture`.
    CreateTexture {
        /// Recorder-local handle.
        texture: TextureHandle,
        /// Shape of the texture.
        descriptor: TextureDescriptor,
    },
    /// Commit a region of a sparse texture.
    CommitRegion {
        /// Recorder-local handle.
        texture: TextureHandle,
        /// Left edge.
        x: u32,
        /// Top edge.
        y: u32,
        /// Width.
        width: u32,
        /// Height.
        height: u32,
    },
    /// Upload tightly packed pixels.
    UploadRegion {
        /// Recorder-local handle.
        texture: TextureHandle,
        /// Destination, with `row_length == width`.
        region: UploadRegion,
        /// `width * height` RGBA pixels.
        pixels: Vec<u8>,
    },
    /// Destroy a texture.
    DestroyTexture {
        /// Recorder-local handle.
        texture: TextureHandle,
    },
}

/// A [`TextureBackend`] that records commands for later replay.
#[derive(Default)]
pub struct AtlasCommandRecorder {
    /// The recorded commands.
    pub commands: Vec<AtlasCommand>,
    next_handle: u32,
}

impl AtlasCommandRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the recorded commands, leaving the recorder empty. Handles stay valid.
    pub fn take_commands(&mut self) -> Vec<AtlasCommand> {
        core::mem::take(&mut self.commands)
    }
}

impl core::fmt::Debug for AtlasCommandRecorder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AtlasCommandRecorder")
            .field("commands", &self.commands.len())
            .field("next_handle", &self.next_handle)
            .finish()
    }
}

impl TextureBackend for AtlasCommandRecorder {
    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> TextureHandle {
        let texture = TextureHandle(self.next_handle);
        self.next_handle += 1;
        self.commands.push(AtlasCommand::CreateTexture {
            texture,
            descriptor: *descriptor,
        });
        texture
    }

    fn commit_region(&mut self, texture: TextureHandle, x: u32, y: u32, width: u32, height: u32) {
        self.commands.push(AtlasCommand::CommitRegion {
            texture,
            x,
            y,
            width,
            height,
        });
    }

    fn upload_region(&mut self, texture: TextureHandle, region: &UploadRegion, pixels: &[u8]) {
        let row_bytes = region.width as usize * 4;
        let src_stride = region.row_length as usize * 4;
        let mut packed = Vec::with_capacity(row_bytes * region.height as usize);
        for row in 0..region.height as usize {
            let start = row * src_stride;
            let Some(src) = pixels.get(start..start + row_bytes) else {
                log::warn!("upload {region:?} is short of pixel data, truncating");
                break;
            };
            packed.extend_from_slice(src);
        }
        self.commands.push(AtlasCommand::UploadRegion {
            texture,
            region: UploadRegion {
                row_length: region.width,
                ..*region
            },
            pixels: packed,
        });
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.commands.push(AtlasCommand::DestroyTexture { texture });
    }
}

/// Replays recorded commands into a live backend.
///
/// The replayer remembers which backend texture each recorded handle was created as,
/// so commands recorded over several frames can be replayed incrementally.
#[derive(Debug, Default)]
pub struct AtlasReplayer {
    handles: HashMap<TextureHandle, TextureHandle>,
}

impl AtlasReplayer {
    /// Creates a replayer with no known textures.
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend texture created for a recorded handle.
    pub fn resolve(&self, recorded: TextureHandle) -> Option<TextureHandle> {
        self.handles.get(&recorded).copied()
    }

    /// Replays `commands` into `target`.
    ///
    /// Commands that refer to a handle whose creation was never replayed are skipped.
    pub fn replay<B: TextureBackend + ?Sized>(
        &mut self,
        commands: &[AtlasCommand],
        target: &mut B,
    ) {
        for command in commands {
            match command {
                AtlasCommand::CreateTexture {
                    texture,
                    descriptor,
                } => {
                    let live = target.create_texture(descriptor);
                    self.handles.insert(*texture, live);
                }
                AtlasCommand::CommitRegion {
                    texture,
                    x,
                    y,
                    width,
                    height,
                } => {
                    if let Some(live) = self.lookup(*texture) {
                        target.commit_region(live, *x, *y, *width, *height);
                    }
                }
                AtlasCommand::UploadRegion {
                    texture,
                    region,
                    pixels,
                } => {
                    if let Some(live) = self.lookup(*texture) {
                        target.upload_region(live, region, pixels);
                    }
                }
                AtlasCommand::DestroyTexture { texture } => {
                    if let Some(live) = self.handles.remove(texture) {
                        target.destroy_texture(live);
                    }
                }
            }
        }
    }

    fn lookup(&self, recorded: TextureHandle) -> Option<TextureHandle> {
        let live = self.resolve(recorded);
        if live.is_none() {
            log::warn!("skipping command for unknown recorded texture {recorded:?}");
        }
        live
    }
}
