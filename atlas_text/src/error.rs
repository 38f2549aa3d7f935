// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use crate::config::StoreKind;

/// Errors reported by the atlas, the population pipeline and the batch compiler.
///
/// Configuration errors raised by a draw call are reported before any geometry is
/// written, so a failed call never leaves a partial string in the staging buffer.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A gradient draw was requested with fewer than two color stops.
    InsufficientGradientStops {
        /// Number of colors supplied by the caller.
        provided: usize,
    },

    /// A sliced gradient draw was requested with fewer colors than characters.
    InsufficientSliceColors {
        /// Number of colors supplied by the caller.
        provided: usize,
        /// Number of characters in the string (one color per character is required).
        required: usize,
    },

    /// The allocator ran out of room and the backing store cannot grow any further.
    ///
    /// This can only happen for [`StoreKind::Layered`] (all layers full) and
    /// [`StoreKind::SparseVirtual`] (the single page is full). It is a sizing problem:
    /// pick a larger page, more layers or a multi-page store.
    CapacityExhausted {
        /// The store that ran out of room.
        store: StoreKind,
        /// Number of pages in use when the allocation failed.
        pages: u32,
        /// Edge length of a page, in pixels.
        page_size: u32,
    },

    /// The configuration cannot be used to build an atlas.
    InvalidConfig(&'static str),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InsufficientGradientStops { provided } => write!(
                f,
                "gradient text needs at least 2 colors, {provided} provided"
            ),
            Self::InsufficientSliceColors { provided, required } => write!(
                f,
                "sliced text needs one color per character: {required} required, {provided} provided"
            ),
            Self::CapacityExhausted {
                store,
                pages,
                page_size,
            } => write!(
                f,
                "{store:?} glyph atlas is full ({pages} page(s) of {page_size}x{page_size})"
            ),
            Self::InvalidConfig(reason) => write!(f, "invalid atlas configuration: {reason}"),
        }
    }
}

impl core::error::Error for Error {}

/// A glyph could not be rasterized.
///
/// Returned by [`GlyphRasterizer::rasterize`](crate::GlyphRasterizer::rasterize). The
/// population pipeline never propagates it: the glyph is logged, marked bad and drawn as
/// a blank em-box from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterError {
    codepoint: char,
    message: String,
}

impl RasterError {
    /// Creates an error for `codepoint`.
    pub fn new(codepoint: char, message: impl Into<String>) -> Self {
        Self {
            codepoint,
            message: message.into(),
        }
    }

    /// The codepoint that failed to rasterize.
    pub fn codepoint(&self) -> char {
        self.codepoint
    }

    /// Human readable failure reason.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl core::fmt::Display for RasterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "failed to rasterize U+{:04X}: {}",
            u32::from(self.codepoint),
            self.message
        )
    }
}

impl core::error::Error for RasterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::InsufficientSliceColors {
            provided: 3,
            required: 5,
        };
        assert_eq!(
            err.to_string(),
            "sliced text needs one color per character: 5 required, 3 provided"
        );

        let err = RasterError::new('\u{e000}', "no outline");
        assert_eq!(err.to_string(), "failed to rasterize U+E000: no outline");
        assert_eq!(err.codepoint(), '\u{e000}');
    }
}
