// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for glyph colors: inline markup, gradients and slices.

use atlas_text::markup::strip_markup;
use atlas_text::{Color, Error, TextStyle, PALETTE};

use crate::util::{QuadView, TestEnv};

const WHITE: Color = Color::from_rgba8(255, 255, 255, 255);
const RED: Color = Color::from_rgba8(255, 0, 0, 255);
const GREEN: Color = Color::from_rgba8(0, 255, 0, 255);
const BLUE: Color = Color::from_rgba8(0, 0, 255, 255);

fn rgba(color: Color) -> [u8; 4] {
    let rgba = color.to_rgba8();
    [rgba.r, rgba.g, rgba.b, rgba.a]
}

/// Left edge colors of consecutive quads, with repeats collapsed.
fn segments(quads: &[QuadView]) -> Vec<[u8; 4]> {
    let mut segments: Vec<[u8; 4]> = Vec::new();
    for quad in quads {
        if segments.last() != Some(&quad.left) {
            segments.push(quad.left);
        }
    }
    segments
}

fn draw_markup(env: &mut TestEnv, text: &str, color: Color) -> Vec<QuadView> {
    env.warm(text);
    env.submitter.clear();
    env.renderer
        .draw_plain_string(text, 0.0, 0.0, color, 1.0, &mut env.submitter)
        .unwrap();
    env.submitter.quads()
}

#[test]
fn fills_markup_switches_and_resets_color() {
    let mut env = TestEnv::new();
    let quads = draw_markup(&mut env, "§cRed§rReset", WHITE);
    assert_eq!(quads.len(), 8);
    assert_eq!(segments(&quads), [rgba(PALETTE[12]), rgba(WHITE)]);
    assert!(quads.iter().all(|quad| quad.left == quad.right));
    // Markup takes no space.
    assert_eq!(quads[3].x0, 30.0);
}

#[test]
fn fills_markup_accepts_both_lead_ins() {
    let mut env = TestEnv::new();
    let quads = draw_markup(&mut env, "&2a§9b&rc", WHITE);
    assert_eq!(
        segments(&quads),
        [rgba(PALETTE[2]), rgba(PALETTE[9]), rgba(WHITE)]
    );
}

#[test]
fn fills_markup_keeps_base_alpha() {
    let mut env = TestEnv::new();
    let base = Color::from_rgba8(255, 255, 255, 128);
    let quads = draw_markup(&mut env, "§aX", base);
    assert_eq!(quads[0].left, [85, 255, 85, 128]);
}

#[test]
fn fills_markup_unrecognized_sequences_are_text() {
    let mut env = TestEnv::new();
    // A doubled lead-in draws the first one, an unknown code draws both characters and a
    // trailing lead-in is drawn as is.
    let quads = draw_markup(&mut env, "§§ca§zb&", WHITE);
    assert_eq!(quads.len(), 6);
    assert_eq!(quads[0].left, rgba(WHITE));
    assert!(quads[1..].iter().all(|quad| quad.left == rgba(PALETTE[12])));
    assert_eq!(strip_markup("§§ca§zb&"), "§a§zb&");
    // Stripped text is not markup-free when scanned again.
    assert_eq!(strip_markup(&strip_markup("§§ca§zb&")), "§zb&");
}

#[test]
fn fills_gradient_runs_through_every_stop() {
    let mut env = TestEnv::new();
    let text = "abcdefgh";
    env.warm(text);
    env.renderer
        .draw_gradient_string(text, 0.0, 0.0, &[RED, GREEN, BLUE], 1.0, &mut env.submitter)
        .unwrap();
    let quads = env.submitter.quads();
    assert_eq!(quads.len(), 8);
    assert_eq!(quads[0].left, rgba(RED));
    assert_eq!(quads[4].left, rgba(GREEN));
    assert_eq!(quads[7].right, rgba(BLUE));

    for pair in quads.windows(2) {
        assert_eq!(pair[0].right, pair[1].left, "gradient is continuous");
        assert!(pair[1].left[0] <= pair[0].left[0], "red fades out");
        assert!(pair[1].left[2] >= pair[0].left[2], "blue fades in");
    }
    for quad in &quads {
        assert_eq!(quad.left[3], 255);
    }
}

#[test]
fn fills_gradient_ignores_markup_colors() {
    let mut env = TestEnv::new();
    env.warm("ab");
    env.renderer
        .draw_gradient_string("§cab", 0.0, 0.0, &[RED, BLUE], 1.0, &mut env.submitter)
        .unwrap();
    let quads = env.submitter.quads();
    assert_eq!(quads[0].left, rgba(RED));
    assert_eq!(quads[1].right, rgba(BLUE));
}

#[test]
fn fills_gradient_needs_two_stops() {
    let mut env = TestEnv::new();
    env.warm("ab");
    let err = env
        .renderer
        .draw_gradient_string("ab", 0.0, 0.0, &[RED], 1.0, &mut env.submitter)
        .unwrap_err();
    assert_eq!(err, Error::InsufficientGradientStops { provided: 1 });
    assert!(env.submitter.draws.is_empty());
    assert!(env.renderer.staging().is_empty());
}

#[test]
fn fills_slices_blend_between_boundaries() {
    let mut env = TestEnv::new();
    env.warm("abc");
    let colors = [PALETTE[4], PALETTE[2], PALETTE[1], PALETTE[14]];
    env.renderer
        .draw_sliced_string("abc", 0.0, 0.0, &colors, 1.0, &mut env.submitter)
        .unwrap();
    let edges: Vec<([u8; 4], [u8; 4])> = env
        .submitter
        .quads()
        .iter()
        .map(|quad| (quad.left, quad.right))
        .collect();
    assert_eq!(
        edges,
        [
            (rgba(PALETTE[4]), rgba(PALETTE[2])),
            (rgba(PALETTE[2]), rgba(PALETTE[1])),
            (rgba(PALETTE[1]), rgba(PALETTE[14])),
        ]
    );
}

#[test]
fn fills_slices_wrap_around_with_one_color_per_character() {
    let mut env = TestEnv::new();
    env.warm("abc");
    let colors = [PALETTE[4], PALETTE[2], PALETTE[1]];
    env.renderer
        .draw_sliced_string("abc", 0.0, 0.0, &colors, 1.0, &mut env.submitter)
        .unwrap();
    let last = *env.submitter.quads().last().expect("three quads");
    assert_eq!((last.left, last.right), (rgba(PALETTE[1]), rgba(PALETTE[4])));
}

#[test]
fn fills_slices_count_markup_characters() {
    let mut env = TestEnv::new();
    env.warm("ab");
    let colors = [PALETTE[4], PALETTE[2], PALETTE[1], PALETTE[14]];
    env.renderer
        .draw_sliced_string("§cab", 0.0, 0.0, &colors, 1.0, &mut env.submitter)
        .unwrap();
    let quads = env.submitter.quads();
    assert_eq!((quads[0].left, quads[0].right), (rgba(PALETTE[4]), rgba(PALETTE[14])));
    assert_eq!((quads[1].left, quads[1].right), (rgba(PALETTE[14]), rgba(PALETTE[4])));

    let err = env
        .renderer
        .draw_sliced_string("§cab", 0.0, 0.0, &colors[..3], 1.0, &mut env.submitter)
        .unwrap_err();
    assert_eq!(
        err,
        Error::InsufficientSliceColors {
            provided: 3,
            required: 4
        }
    );
}

#[test]
fn fills_every_variant_has_shadowed_and_centered_forms() {
    let mut env = TestEnv::new();
    env.warm("ab");
    let colors = [RED, BLUE];
    let renderer = &mut env.renderer;
    let submitter = &mut env.submitter;

    let calls = [
        renderer.draw_gradient_string_with_shadow("ab", 0.0, 0.0, &colors, 1.0, submitter),
        renderer.draw_centered_gradient_string("ab", 50.0, 0.0, &colors, 1.0, submitter),
        renderer.draw_centered_gradient_string_with_shadow(
            "ab", 50.0, 0.0, &colors, 1.0, submitter,
        ),
        renderer.draw_sliced_string_with_shadow("ab", 0.0, 0.0, &colors, 1.0, submitter),
        renderer.draw_centered_sliced_string("ab", 50.0, 0.0, &colors, 1.0, submitter),
        renderer.draw_centered_sliced_string_with_shadow(
            "ab", 50.0, 0.0, &colors, 1.0, submitter,
        ),
    ];
    let draw_calls: Vec<usize> = calls
        .into_iter()
        .map(|summary| summary.unwrap().draw_calls)
        .collect();
    assert_eq!(draw_calls, [2, 1, 2, 2, 1, 2]);

    let draws = &env.submitter.draws;
    assert_eq!(draws[2].offset(), (40.0, 0.0));
    assert_eq!(draws[3].offset(), (41.0, 1.0));
    assert_eq!(draws[3].quads()[0].left, [0, 0, 0, 160]);
    assert_eq!(draws[4].quads()[0].left, rgba(RED));

    let style = TextStyle::sliced(&colors);
    assert_eq!(style.color, RED);
}
