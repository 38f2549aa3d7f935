// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric helpers shared by metrics, packing and vertex generation.

// From <https://github.com/linebender/tiny-skia/blob/68b198a7210a6bbf752b43d6bc4db62445730313/path/src/scalar.rs#L12>
const SCALAR_NEARLY_ZERO: f32 = 1.0 / (1 << 12) as f32;

/// Nearly-zero checks for `f32`.
pub(crate) trait FloatExt: Sized {
    /// Whether the number is approximately 0.
    fn is_nearly_zero(self) -> bool;
}

impl FloatExt for f32 {
    #[inline(always)]
    fn is_nearly_zero(self) -> bool {
        self.abs() <= SCALAR_NEARLY_ZERO
    }
}

/// Truncates toward zero, saturating at the `i32` range. `NaN` maps to 0.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    reason = "saturating float to int conversion is the intent"
)]
pub(crate) fn trunc_i32(value: f32) -> i32 {
    value as i32
}

/// Maps a texel coordinate to a 16-bit normalized texture coordinate.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    reason = "values are clamped to [0, 1] before scaling to the u16 range"
)]
pub(crate) fn unorm16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16
}

/// Extra horizontal room needed by slanted glyphs on a line of `line_height` pixels.
pub(crate) fn slant_allowance(line_height: i32, angle_degrees: f32) -> i32 {
    #[allow(
        clippy::cast_precision_loss,
        reason = "line heights are far below 2^24"
    )]
    let height = line_height as f32;
    trunc_i32((height * angle_degrees.to_radians().tan()).ceil()).max(0)
}
