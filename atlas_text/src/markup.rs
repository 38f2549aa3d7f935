// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inline color markup.
//!
//! A lead-in character (`§` or `&`) followed by a code switches the current color:
//!
//! - `0`-`9`, `a`-`f` select an entry of [`PALETTE`](crate::PALETTE);
//! - `r` resets to the base color of the draw call.
//!
//! The lead-in and the code occupy no space and produce no glyphs. A lead-in followed by
//! anything else (or at the end of the string) is ordinary text.

use core::iter::{Enumerate, Peekable};
use core::str::Chars;

use crate::color_ext::{Color, PALETTE};

/// Characters that introduce a markup code.
pub const LEAD_INS: [char; 2] = ['§', '&'];

/// A recognized markup code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupCode {
    /// Select the palette entry with this index (`0..16`).
    Palette(u8),
    /// Return to the base color.
    Reset,
}

impl MarkupCode {
    /// Parses the character following a lead-in.
    pub fn from_char(code: char) -> Option<Self> {
        match code {
            'r' => Some(Self::Reset),
            '0'..='9' | 'a'..='f' => code
                .to_digit(16)
                .and_then(|index| u8::try_from(index).ok())
                .map(Self::Palette),
            _ => None,
        }
    }

    /// The color this code selects for a draw whose base color is `base`.
    ///
    /// Palette colors inherit the alpha of the base color.
    pub fn resolve(self, base: Color) -> Color {
        match self {
            Self::Reset => base,
            Self::Palette(index) => {
                let [r, g, b, _] = PALETTE[usize::from(index) & 0xF].components;
                Color::new([r, g, b, base.components[3]])
            }
        }
    }
}

/// An item of scanned text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// A character to draw. `index` counts characters, markup included.
    Glyph {
        /// Position of the character in the string, in characters.
        index: usize,
        /// The character.
        ch: char,
    },
    /// A line break.
    Newline,
    /// A color switch. Consumes two characters.
    Markup(MarkupCode),
}

/// Splits a string into glyphs, line breaks and markup codes.
#[derive(Clone, Debug)]
pub struct MarkupScanner<'a> {
    chars: Peekable<Enumerate<Chars<'a>>>,
}

impl<'a> MarkupScanner<'a> {
    /// Scans `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().enumerate().peekable(),
        }
    }
}

impl Iterator for MarkupScanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let (index, ch) = self.chars.next()?;
        if ch == '\n' {
            return Some(Token::Newline);
        }
        if LEAD_INS.contains(&ch) {
            if let Some(code) = self
                .chars
                .peek()
                .and_then(|&(_, next)| MarkupCode::from_char(next))
            {
                self.chars.next();
                return Some(Token::Markup(code));
            }
        }
        Some(Token::Glyph { index, ch })
    }
}

/// Returns `text` with all markup codes removed.
///
/// Scanning the result again may find new codes: `§§ca` strips to `§a`, which is itself
/// a code. Request or draw the original string, not its stripped form.
pub fn strip_markup(text: &str) -> String {
    MarkupScanner::new(text)
        .filter_map(|token| match token {
            Token::Glyph { ch, .. } => Some(ch),
            Token::Newline => Some('\n'),
            Token::Markup(_) => None,
        })
        .collect()
}
