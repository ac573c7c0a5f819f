// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// Upper half block: the foreground paints the top pixel, the background the
/// bottom one.
pub const UPPER_HALF: char = '\u{2580}';
pub const LOWER_HALF: char = '\u{2584}';
pub const FULL_BLOCK: char = '\u{2588}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
        bold: false,
    };

    pub fn text(ch: char, fg: Option<Color>, bg: Option<Color>, bold: bool) -> Self {
        Self { ch, fg, bg, bold }
    }

    /// Two stacked pixels in one cell.
    pub fn half_blocks(top: Option<Color>, bottom: Option<Color>) -> Self {
        Self {
            ch: UPPER_HALF,
            fg: top,
            bg: bottom,
            bold: false,
        }
    }

    /// Two stacked pixels without color support: each one is either lit or not.
    pub fn mono_blocks(top: bool, bottom: bool) -> Self {
        let ch = match (top, bottom) {
            (false, false) => ' ',
            (true, false) => UPPER_HALF,
            (false, true) => LOWER_HALF,
            (true, true) => FULL_BLOCK,
        };
        Self { ch, ..Self::BLANK }
    }
}
