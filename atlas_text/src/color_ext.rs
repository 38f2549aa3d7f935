// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors used by text markup and vertex packing.

use peniko::color::{AlphaColor, Srgb};

/// The color type used throughout the crate.
pub type Color = AlphaColor<Srgb>;

/// The sixteen colors selected by the markup codes `0`-`9` and `a`-`f`.
pub const PALETTE: [Color; 16] = [
    Color::from_rgba8(0, 0, 0, 255),
    Color::from_rgba8(0, 0, 170, 255),
    Color::from_rgba8(0, 170, 0, 255),
    Color::from_rgba8(0, 170, 170, 255),
    Color::from_rgba8(170, 0, 0, 255),
    Color::from_rgba8(170, 0, 170, 255),
    Color::from_rgba8(255, 170, 0, 255),
    Color::from_rgba8(170, 170, 170, 255),
    Color::from_rgba8(85, 85, 85, 255),
    Color::from_rgba8(85, 85, 255, 255),
    Color::from_rgba8(85, 255, 85, 255),
    Color::from_rgba8(85, 255, 255, 255),
    Color::from_rgba8(255, 85, 85, 255),
    Color::from_rgba8(255, 85, 255, 255),
    Color::from_rgba8(255, 255, 85, 255),
    Color::from_rgba8(255, 255, 255, 255),
];

/// Packs a color into the vertex color word: RGBA8, red in the lowest byte.
#[inline]
pub(crate) fn pack_color(color: Color) -> u32 {
    let rgba = color.to_rgba8();
    u32::from_le_bytes([rgba.r, rgba.g, rgba.b, rgba.a])
}

/// Component-wise interpolation in sRGB, `t` in `[0, 1]`.
pub(crate) fn mix(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let [r0, g0, b0, a0] = from.components;
    let [r1, g1, b1, a1] = to.components;
    Color::new([
        r0 + (r1 - r0) * t,
        g0 + (g1 - g0) * t,
        b0 + (b1 - b0) * t,
        a0 + (a1 - a0) * t,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_red_in_low_byte() {
        let packed = pack_color(Color::from_rgba8(0x11, 0x22, 0x33, 0x44));
        assert_eq!(packed, 0x4433_2211);
    }

    #[test]
    fn mix_endpoints() {
        let a = PALETTE[0];
        let b = PALETTE[15];
        assert_eq!(pack_color(mix(a, b, 0.0)), pack_color(a));
        assert_eq!(pack_color(mix(a, b, 1.0)), pack_color(b));
        let mid = mix(a, b, 0.5).to_rgba8();
        assert!((127..=128).contains(&mid.r), "mid red was {}", mid.r);
    }
}
