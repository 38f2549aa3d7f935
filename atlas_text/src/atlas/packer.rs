// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forward-only shelf packing.
//!
//! Glyph cells are placed left to right along a shelf one line-height tall. When a cell
//! does not fit horizontally a new shelf is opened below; when a shelf does not fit
//! vertically the packer moves on to the next page. The cursor never moves backwards,
//! so cells never overlap and freed space is never reused.

use super::region::PixelRect;

/// Where a cell was placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Page index.
    pub page: u32,
    /// The reserved cell, padding included.
    pub cell: PixelRect,
    /// Whether this placement moved the cursor onto a new page.
    pub new_page: bool,
}

/// Why a cell could not be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PackError {
    /// The cell is wider than a page.
    TooWide,
    /// No page has room and no further page may be opened.
    Exhausted,
}

/// The shelf packer cursor.
#[derive(Clone, Debug)]
pub struct ShelfPacker {
    page_size: u32,
    shelf_height: u32,
    max_pages: Option<u32>,
    page: u32,
    pen_x: u32,
    pen_y: u32,
    shelf_open: bool,
    shelves: u32,
}

impl ShelfPacker {
    /// Creates a packer for square pages of `page_size` with shelves `shelf_height` tall.
    ///
    /// `max_pages` of `None` lets the packer open pages indefinitely.
    pub fn new(page_size: u32, shelf_height: u32, max_pages: Option<u32>) -> Self {
        Self {
            page_size,
            shelf_height,
            max_pages,
            page: 0,
            pen_x: 0,
            pen_y: 0,
            shelf_open: false,
            shelves: 0,
        }
    }

    pub(crate) fn place(&mut self, width: u32) -> Result<Placement, PackError> {
        if width > self.page_size {
            return Err(PackError::TooWide);
        }
        if self.pen_x + width > self.page_size {
            self.pen_x = 0;
            self.pen_y += self.shelf_height;
            self.shelf_open = false;
        }
        let mut new_page = false;
        if self.pen_y + self.shelf_height > self.page_size {
            let next = self.page + 1;
            if self.max_pages.is_some_and(|max| next >= max) || self.pen_y == 0 {
                return Err(PackError::Exhausted);
            }
            self.page = next;
            self.pen_x = 0;
            self.pen_y = 0;
            self.shelf_open = false;
            new_page = true;
        }
        if !self.shelf_open {
            self.shelves += 1;
            self.shelf_open = true;
        }
        let cell = PixelRect::new(self.pen_x, self.pen_y, width, self.shelf_height);
        self.pen_x += width;
        Ok(Placement {
            page: self.page,
            cell,
            new_page,
        })
    }

    /// Current page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// The cursor within the current page, as `(x, y)`.
    pub fn cursor(&self) -> (u32, u32) {
        (self.pen_x, self.pen_y)
    }

    /// Number of shelves holding at least one cell, across all pages.
    pub fn shelves_used(&self) -> u32 {
        self.shelves
    }

    /// Height of every shelf.
    pub fn shelf_height(&self) -> u32 {
        self.shelf_height
    }

    /// Moves the cursor back to the top-left of page 0.
    pub fn reset(&mut self) {
        self.page = 0;
        self.pen_x = 0;
        self.pen_y = 0;
        self.shelf_open = false;
        self.shelves = 0;
    }
}
