// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph population.
//!
//! Once per frame a bounded batch of queued codepoints is rasterized side by side into
//! one scratch image, one shelf tall. Cells are then placed in the atlas in queue order
//! and runs of cells that are adjacent both in the scratch image and on a shelf are
//! uploaded with a single strided copy. Records are published only after every upload
//! of the batch has been issued, so a draw never sees a glyph whose pixels are missing.

use crate::atlas::{AtlasAllocator, GlyphDirectory, GlyphRecord, PixelRect, UvRect};
use crate::backends::TextureBackend;
use crate::error::Error;
use crate::metrics::MetricsCache;
use crate::rasterizer::{GlyphBitmap, GlyphRasterizer, RenderOptions};

/// Outcome of one population pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Glyphs placed in the atlas and published.
    pub populated: usize,
    /// Glyphs published as blank placeholders instead.
    pub failed: usize,
    /// Upload calls issued.
    pub uploads: usize,
}

const BACKGROUND: [u8; 4] = [0xFF, 0xFF, 0xFF, 0x00];

/// RGBA staging image the batch is rasterized into.
#[derive(Debug, Default)]
struct ScratchImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ScratchImage {
    fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data
            .resize(width as usize * height as usize * 4, BACKGROUND[0]);
        for pixel in self.data.chunks_exact_mut(4) {
            pixel[3] = BACKGROUND[3];
        }
    }

    /// Draws `bitmap` as white with coverage in alpha, its pen position at `pen_x` and
    /// its baseline at `baseline`. Pixels outside `clip` columns are dropped.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "coordinates are bounds-checked against the image before indexing"
    )]
    fn blit(&mut self, pen_x: u32, baseline: i32, bitmap: &GlyphBitmap, clip: (u32, u32)) {
        let left = i64::from(pen_x) + i64::from(bitmap.left);
        let top = i64::from(baseline) - i64::from(bitmap.top);
        let (clip_start, clip_end) = (i64::from(clip.0), i64::from(clip.1));
        for row in 0..bitmap.height {
            let y = top + i64::from(row);
            if y < 0 || y >= i64::from(self.height) {
                continue;
            }
            for col in 0..bitmap.width {
                let x = left + i64::from(col);
                if x < clip_start || x >= clip_end {
                    continue;
                }
                let source = row as usize * bitmap.width as usize + col as usize;
                let coverage = bitmap.coverage.get(source).copied().unwrap_or(0);
                // Both coordinates are inside the image here.
                let offset = (y as usize * self.width as usize + x as usize) * 4;
                self.data[offset..offset + 4].copy_from_slice(&[0xFF, 0xFF, 0xFF, coverage]);
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Cell {
    ch: char,
    scratch_x: u32,
    reserved: u32,
    ink: i32,
    advance: i32,
    failed: bool,
}

/// Consecutive cells uploaded together.
#[derive(Clone, Copy, Debug)]
struct Run {
    page: u32,
    x: u32,
    y: u32,
    scratch_x: u32,
    width: u32,
}

impl Run {
    fn extends_to(&self, page: u32, cell: PixelRect, scratch_x: u32) -> bool {
        self.page == page
            && self.y == cell.y
            && self.x + self.width == cell.x
            && self.scratch_x + self.width == scratch_x
    }
}

/// Reusable buffers of the population pass.
#[derive(Debug, Default)]
pub struct PopulationPipeline {
    scratch: ScratchImage,
    cells: Vec<Cell>,
    placed: Vec<(usize, u32, PixelRect)>,
}

impl PopulationPipeline {
    /// Creates a pipeline with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates up to `max_count` queued glyphs.
    ///
    /// Rasterization failures and cells wider than a page become blank placeholders and
    /// are not retried. Running out of atlas capacity uploads what fit, turns the rest of
    /// the batch into placeholders and returns [`Error::CapacityExhausted`].
    pub fn run<R, B>(
        &mut self,
        max_count: usize,
        rasterizer: &mut R,
        options: &RenderOptions,
        metrics: &mut MetricsCache,
        directory: &mut GlyphDirectory,
        allocator: &mut AtlasAllocator,
        backend: &mut B,
    ) -> Result<PopulateReport, Error>
    where
        R: GlyphRasterizer + ?Sized,
        B: TextureBackend + ?Sized,
    {
        let batch = directory.queue().drain(max_count);
        if batch.is_empty() {
            return Ok(PopulateReport::default());
        }
        let font = *metrics.font();
        let shelf_height = allocator.packer().shelf_height();
        let char_height = u32::try_from(font.char_height()).unwrap_or(0);
        let padding = allocator.padding();
        let placeholder = GlyphRecord::placeholder(font.char_height(), font.char_height());

        self.cells.clear();
        let mut total_width = 0_u32;
        for ch in batch {
            let ink = metrics.ink_width(ch, rasterizer);
            let reserved = u32::try_from(ink).unwrap_or(0) + 2 * padding;
            self.cells.push(Cell {
                ch,
                scratch_x: total_width,
                reserved,
                ink,
                advance: metrics.width(ch, rasterizer),
                failed: false,
            });
            total_width += reserved;
        }
        log::debug!(
            "populating {} glyph(s) into a {total_width}x{shelf_height} scratch image",
            self.cells.len()
        );

        self.scratch.reset(total_width, shelf_height);
        for cell in &mut self.cells {
            match rasterizer.rasterize(cell.ch, options) {
                Ok(glyph) => {
                    if cell.ink > 0 && !glyph.is_empty() {
                        let clip = (cell.scratch_x, cell.scratch_x + cell.reserved);
                        self.scratch
                            .blit(cell.scratch_x + padding, font.ascent, &glyph.bitmap, clip);
                    }
                }
                Err(err) => {
                    log::warn!("{err}; drawing it as an empty box");
                    cell.failed = true;
                }
            }
        }

        let mut report = PopulateReport::default();
        let mut outcome = Ok(());
        let mut run: Option<Run> = None;
        self.placed.clear();
        for (index, cell) in self.cells.iter().enumerate() {
            if cell.failed {
                directory.publish(cell.ch, placeholder);
                metrics.mark_placeholder(cell.ch);
                report.failed += 1;
                continue;
            }
            match allocator.place(cell.reserved) {
                Ok(Some(placement)) => {
                    let extends = run.as_ref().is_some_and(|current| {
                        current.extends_to(placement.page, placement.cell, cell.scratch_x)
                    });
                    if extends {
                        if let Some(current) = run.as_mut() {
                            current.width += cell.reserved;
                        }
                    } else {
                        if let Some(done) = run.take() {
                            upload_run(&done, &self.scratch, allocator, backend);
                            report.uploads += 1;
                        }
                        run = Some(Run {
                            page: placement.page,
                            x: placement.cell.x,
                            y: placement.cell.y,
                            scratch_x: cell.scratch_x,
                            width: cell.reserved,
                        });
                    }
                    self.placed.push((index, placement.page, placement.cell));
                }
                Ok(None) => {
                    log::warn!(
                        "U+{:04X} needs a {}px cell, wider than the {}px atlas page",
                        u32::from(cell.ch),
                        cell.reserved,
                        allocator.page_size()
                    );
                    directory.publish(cell.ch, placeholder);
                    metrics.mark_placeholder(cell.ch);
                    report.failed += 1;
                }
                Err(err) => {
                    let dropped = self.cells.len() - index;
                    log::error!("{err}; {dropped} glyph(s) will be drawn as empty boxes");
                    for rest in &self.cells[index..] {
                        directory.publish(rest.ch, placeholder);
                        metrics.mark_placeholder(rest.ch);
                    }
                    report.failed += dropped;
                    outcome = Err(err);
                    break;
                }
            }
        }
        if let Some(done) = run.take() {
            upload_run(&done, &self.scratch, allocator, backend);
            report.uploads += 1;
        }

        let page_size = allocator.page_size();
        for &(index, page, cell_rect) in &self.placed {
            let cell = &self.cells[index];
            let x0 = cell_rect.x + padding;
            let x1 = x0 + u32::try_from(cell.ink).unwrap_or(0);
            let y1 = cell_rect.y + char_height;
            directory.publish(
                cell.ch,
                GlyphRecord {
                    advance: cell.advance,
                    render_width: cell.ink,
                    height: font.char_height(),
                    page,
                    uv: UvRect::from_pixels(x0, cell_rect.y, x1, y1, page_size),
                    cell: Some(cell_rect),
                },
            );
        }
        report.populated = self.placed.len();
        log::trace!("population pass finished: {report:?}");
        outcome.map(|()| report)
    }
}

fn upload_run<B: TextureBackend + ?Sized>(
    run: &Run,
    scratch: &ScratchImage,
    allocator: &mut AtlasAllocator,
    backend: &mut B,
) {
    let offset = run.scratch_x as usize * 4;
    let rect = PixelRect::new(run.x, run.y, run.width, scratch.height);
    allocator.upload(run.page, rect, &scratch.data[offset..], scratch.width, backend);
}
