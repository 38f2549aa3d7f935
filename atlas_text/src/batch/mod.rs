// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning styled strings into vertices and draw calls.
//!
//! A string is compiled in two steps. The walk resolves every glyph, tracks the pen and
//! the current color and collects one quad per visible glyph. Submission then writes the
//! quads into the frame's [`StagingBuffer`] and issues draw calls grouped by atlas page:
//!
//! - if the atlas has a single page, one draw covers the whole string;
//! - [`BatchMethod::Sequential`] reorders quads so each page's quads are contiguous and
//!   issues one draw per page;
//! - [`BatchMethod::MultiDraw`] keeps string order and issues one multi-draw per page
//!   over the runs of consecutive quads on that page.

mod staging;
mod submit;
mod vertex;

pub use staging::{StagingBuffer, StagingRange, STAGING_ALIGNMENT};
pub use submit::{DrawCall, DrawSubmitter, MultiDrawCall, Topology};
pub use vertex::{GlyphVertex, VERTEX_SIZE, VERTICES_PER_GLYPH};

use smallvec::SmallVec;

use crate::atlas::{AtlasAllocator, GlyphDirectory};
use crate::color_ext::{mix, pack_color, Color};
use crate::config::BatchMethod;
use crate::error::Error;
use crate::kurbo::Affine;
use crate::markup::{MarkupScanner, Token};
use crate::math::FloatExt;
use vertex::GlyphQuad;

/// How glyph colors are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TextFill<'a> {
    /// The base color, switched by inline markup.
    #[default]
    Markup,
    /// A horizontal gradient across the whole string, at least two stops. Markup codes
    /// are skipped but do not change the color.
    Gradient(&'a [Color]),
    /// One color per character boundary: character `i` blends from the color of the
    /// previous boundary to `colors[i + 1]`. Needs at least one color per character,
    /// markup characters included. With exactly one per character the last character
    /// blends back to `colors[0]`.
    Sliced(&'a [Color]),
}

/// Appearance of a drawn string.
#[derive(Clone, Copy, Debug)]
pub struct TextStyle<'a> {
    /// Base color, also the color `§r` resets to.
    pub color: Color,
    /// Scale applied to the font's pixel metrics.
    pub scale: f32,
    /// Color selection.
    pub fill: TextFill<'a>,
    /// Draw every glyph in the renderer's shadow color.
    pub shadow: bool,
}

impl<'a> TextStyle<'a> {
    /// Plain text in `color`, at scale 1.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            scale: 1.0,
            fill: TextFill::Markup,
            shadow: false,
        }
    }

    /// A gradient across `colors`, based on its first color.
    pub fn gradient(colors: &'a [Color]) -> Self {
        Self {
            fill: TextFill::Gradient(colors),
            ..Self::new(first_or_white(colors))
        }
    }

    /// A per-character gradient over `colors`, based on its first color.
    pub fn sliced(colors: &'a [Color]) -> Self {
        Self {
            fill: TextFill::Sliced(colors),
            ..Self::new(first_or_white(colors))
        }
    }

    /// Returns a copy with a different scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Returns a copy drawn in the shadow color.
    pub fn shadowed(mut self) -> Self {
        self.shadow = true;
        self
    }
}

fn first_or_white(colors: &[Color]) -> Color {
    colors
        .first()
        .copied()
        .unwrap_or(Color::from_rgba8(255, 255, 255, 255))
}

/// What a compiled string produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Quads written.
    pub glyphs: usize,
    /// Glyphs left out because they are not in the atlas yet.
    pub skipped: usize,
    /// Draw and multi-draw calls issued.
    pub draw_calls: usize,
}

impl core::ops::Add for BatchSummary {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            glyphs: self.glyphs + other.glyphs,
            skipped: self.skipped + other.skipped,
            draw_calls: self.draw_calls + other.draw_calls,
        }
    }
}

/// Font-dependent inputs of the walk.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WalkParams {
    pub(crate) line_height: f32,
    /// Distance between gradient stops, in local units.
    pub(crate) gradient_span: f32,
    pub(crate) shadow_color: Color,
}

#[derive(Clone, Copy, Debug)]
struct PageGroup {
    page: u32,
    quads: usize,
}

/// Reusable buffers for compiling strings.
#[derive(Debug, Default)]
pub struct BatchCompiler {
    quads: Vec<GlyphQuad>,
    groups: SmallVec<[PageGroup; 4]>,
    first_vertices: Vec<u32>,
    vertex_counts: Vec<u32>,
}

impl BatchCompiler {
    /// Creates a compiler with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that the fill has enough colors for `text`.
    pub fn validate(text: &str, fill: &TextFill<'_>) -> Result<(), Error> {
        match fill {
            TextFill::Markup => Ok(()),
            TextFill::Gradient(colors) if colors.len() < 2 => {
                Err(Error::InsufficientGradientStops {
                    provided: colors.len(),
                })
            }
            TextFill::Gradient(_) => Ok(()),
            TextFill::Sliced(colors) => {
                let required = text.chars().count();
                if colors.len() < required {
                    Err(Error::InsufficientSliceColors {
                        provided: colors.len(),
                        required,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Walks `text`, collecting quads for every resolved glyph. Returns how many glyphs
    /// were skipped because they are not in the atlas yet.
    pub(crate) fn walk(
        &mut self,
        text: &str,
        style: &TextStyle<'_>,
        params: &WalkParams,
        directory: &GlyphDirectory,
    ) -> usize {
        self.quads.clear();
        let char_count = text.chars().count();
        let base = style.color;
        let mut current = base;
        let mut skipped = 0;
        let (mut pen_x, mut pen_y) = (0.0_f32, 0.0_f32);

        for token in MarkupScanner::new(text) {
            let (index, ch) = match token {
                Token::Newline => {
                    pen_x = 0.0;
                    pen_y += params.line_height;
                    continue;
                }
                Token::Markup(code) => {
                    if matches!(style.fill, TextFill::Markup) {
                        current = code.resolve(base);
                    }
                    continue;
                }
                Token::Glyph { index, ch } => (index, ch),
            };
            let Some(record) = directory.resolve(ch) else {
                skipped += 1;
                continue;
            };

            #[allow(
                clippy::cast_precision_loss,
                reason = "glyph metrics are small integers"
            )]
            let (render_width, height, advance) = (
                record.render_width as f32,
                record.height as f32,
                record.advance as f32,
            );
            let (x0, x1) = (pen_x, pen_x + render_width);
            let (left, right) = if style.shadow {
                (params.shadow_color, params.shadow_color)
            } else {
                match style.fill {
                    TextFill::Markup => (current, current),
                    TextFill::Gradient(colors) => (
                        gradient_at(colors, x0, params.gradient_span),
                        gradient_at(colors, x1, params.gradient_span),
                    ),
                    TextFill::Sliced(colors) => {
                        let right = if colors.len() == char_count && index + 1 == char_count {
                            colors[0]
                        } else {
                            colors[index + 1]
                        };
                        let left = core::mem::replace(&mut current, right);
                        (left, right)
                    }
                }
            };

            if !record.is_blank() {
                self.quads.push(GlyphQuad {
                    x0,
                    y0: pen_y,
                    x1,
                    y1: pen_y + height,
                    uv: record.uv,
                    left: pack_color(left),
                    right: pack_color(right),
                    page: record.page,
                });
            }
            pen_x += advance;
        }
        skipped
    }

    /// Number of quads collected by the last walk.
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Writes the collected quads into `staging` and issues draw calls. Returns the
    /// number of calls issued.
    pub(crate) fn submit<S: DrawSubmitter + ?Sized>(
        &mut self,
        staging: &mut StagingBuffer,
        method: BatchMethod,
        allocator: &AtlasAllocator,
        transform: Affine,
        submitter: &mut S,
    ) -> usize {
        if self.quads.is_empty() {
            return 0;
        }
        let range = staging.reserve(self.quads.len() * VERTICES_PER_GLYPH * VERTEX_SIZE);
        let base_vertex = range.first_vertex();

        self.groups.clear();
        for quad in &self.quads {
            match self.groups.iter_mut().find(|group| group.page == quad.page) {
                Some(group) => group.quads += 1,
                None => self.groups.push(PageGroup {
                    page: quad.page,
                    quads: 1,
                }),
            }
        }

        if allocator.page_count() <= 1 || self.groups.len() == 1 {
            self.write_in_order(staging, range);
            let page = self.quads[0].page;
            let vertex_count = self.quads.len() * VERTICES_PER_GLYPH;
            return usize::from(draw(
                submitter,
                staging,
                allocator,
                page,
                base_vertex,
                vertex_count,
                transform,
            ));
        }

        match method {
            BatchMethod::Sequential => {
                // Vertex cursor of each group, in string-relative quads.
                let mut cursors: SmallVec<[usize; 4]> = SmallVec::new();
                let mut start = 0;
                for group in &self.groups {
                    cursors.push(start);
                    start += group.quads;
                }
                for quad in &self.quads {
                    let slot = self
                        .groups
                        .iter()
                        .position(|group| group.page == quad.page)
                        .unwrap_or(0);
                    let at = cursors[slot] * VERTICES_PER_GLYPH * VERTEX_SIZE;
                    staging.write(range, at, &quad.vertices());
                    cursors[slot] += 1;
                }
                let mut calls = 0;
                let mut start = 0;
                for group in &self.groups {
                    let first = base_vertex + start * VERTICES_PER_GLYPH;
                    let count = group.quads * VERTICES_PER_GLYPH;
                    calls += usize::from(draw(
                        submitter, staging, allocator, group.page, first, count, transform,
                    ));
                    start += group.quads;
                }
                calls
            }
            BatchMethod::MultiDraw => {
                self.write_in_order(staging, range);
                let mut calls = 0;
                for group in &self.groups {
                    self.first_vertices.clear();
                    self.vertex_counts.clear();
                    let mut run_start = None;
                    for (index, quad) in self.quads.iter().enumerate() {
                        match (quad.page == group.page, run_start) {
                            (true, None) => run_start = Some(index),
                            (false, Some(start)) => {
                                push_run(
                                    &mut self.first_vertices,
                                    &mut self.vertex_counts,
                                    base_vertex,
                                    start,
                                    index,
                                );
                                run_start = None;
                            }
                            _ => {}
                        }
                    }
                    if let Some(start) = run_start {
                        push_run(
                            &mut self.first_vertices,
                            &mut self.vertex_counts,
                            base_vertex,
                            start,
                            self.quads.len(),
                        );
                    }
                    let Some(binding) = allocator.binding(group.page) else {
                        log::warn!("no texture bound for atlas page {}", group.page);
                        continue;
                    };
                    log::trace!(
                        "multi-draw {} run(s) on page {}",
                        self.first_vertices.len(),
                        group.page
                    );
                    submitter.multi_draw(&MultiDrawCall {
                        topology: Topology::TriangleList,
                        staging,
                        first_vertices: &self.first_vertices,
                        vertex_counts: &self.vertex_counts,
                        binding,
                        transform,
                    });
                    calls += 1;
                }
                calls
            }
        }
    }

    fn write_in_order(&self, staging: &mut StagingBuffer, range: StagingRange) {
        for (index, quad) in self.quads.iter().enumerate() {
            let at = index * VERTICES_PER_GLYPH * VERTEX_SIZE;
            staging.write(range, at, &quad.vertices());
        }
    }
}

/// Records quads `start..end` as one multi-draw range.
fn push_run(
    first_vertices: &mut Vec<u32>,
    vertex_counts: &mut Vec<u32>,
    base_vertex: usize,
    start: usize,
    end: usize,
) {
    first_vertices.push(to_u32(base_vertex + start * VERTICES_PER_GLYPH));
    vertex_counts.push(to_u32((end - start) * VERTICES_PER_GLYPH));
}

fn draw<S: DrawSubmitter + ?Sized>(
    submitter: &mut S,
    staging: &StagingBuffer,
    allocator: &AtlasAllocator,
    page: u32,
    first_vertex: usize,
    vertex_count: usize,
    transform: Affine,
) -> bool {
    let Some(binding) = allocator.binding(page) else {
        log::warn!("no texture bound for atlas page {page}");
        return false;
    };
    log::trace!("draw {vertex_count} vertices from {first_vertex} on page {page}");
    submitter.draw(&DrawCall {
        topology: Topology::TriangleList,
        staging,
        first_vertex: to_u32(first_vertex),
        vertex_count: to_u32(vertex_count),
        binding,
        transform,
    });
    true
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Color of a horizontal gradient at `x`, with stops `span` apart.
fn gradient_at(colors: &[Color], x: f32, span: f32) -> Color {
    if span.is_nearly_zero() || colors.len() < 2 {
        return first_or_white(colors);
    }
    let last = colors.len() - 1;
    #[allow(
        clippy::cast_precision_loss,
        reason = "stop counts are small"
    )]
    let ratio = (x / span).clamp(0.0, last as f32);
    let floor = ratio.floor();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "ratio is clamped to the stop range"
    )]
    let lo = floor as usize;
    let hi = (lo + 1).min(last);
    mix(colors[lo], colors[hi], ratio - floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_ext::PALETTE;

    #[test]
    fn gradient_endpoints_and_midpoint() {
        let colors = [PALETTE[0], PALETTE[15], PALETTE[0]];
        assert_eq!(pack_color(gradient_at(&colors, 0.0, 10.0)), pack_color(PALETTE[0]));
        assert_eq!(pack_color(gradient_at(&colors, 10.0, 10.0)), pack_color(PALETTE[15]));
        assert_eq!(pack_color(gradient_at(&colors, 25.0, 10.0)), pack_color(PALETTE[0]));
        let quarter = gradient_at(&colors, 2.5, 10.0).to_rgba8();
        assert!((63..=64).contains(&quarter.r), "red was {}", quarter.r);
    }

    #[test]
    fn zero_span_gradient_uses_first_stop() {
        let colors = [PALETTE[4], PALETTE[2]];
        assert_eq!(pack_color(gradient_at(&colors, 3.0, 0.0)), pack_color(PALETTE[4]));
    }

    #[test]
    fn validation() {
        let one = [PALETTE[1]];
        let two = [PALETTE[1], PALETTE[2]];
        assert_eq!(
            BatchCompiler::validate("abc", &TextFill::Gradient(&one)),
            Err(Error::InsufficientGradientStops { provided: 1 })
        );
        assert!(BatchCompiler::validate("abc", &TextFill::Gradient(&two)).is_ok());
        assert_eq!(
            BatchCompiler::validate("abc", &TextFill::Sliced(&two)),
            Err(Error::InsufficientSliceColors {
                provided: 2,
                required: 3
            })
        );
        assert!(BatchCompiler::validate("ab", &TextFill::Sliced(&two)).is_ok());
        assert!(BatchCompiler::validate("", &TextFill::Markup).is_ok());
    }
}
