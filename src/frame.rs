// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// A terminal-sized grid of cells that remembers which cells changed since the
/// last time it was flushed.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
        } else {
            for &i in &self.dirty {
                self.dirty_map[i] = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    /// Writes `text` starting at `(x, y)`, clipped to the frame and to `max_w`
    /// columns. Returns the column after the last written char.
    #[allow(clippy::too_many_arguments)]
    pub fn put_str(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        max_w: u16,
        fg: Option<Color>,
        bg: Option<Color>,
        bold: bool,
    ) -> u16 {
        let mut col = x;
        for ch in text.chars().take(max_w as usize) {
            if col >= self.width {
                break;
            }
            self.set(col, y, Cell::text(ch, fg, bg, bold));
            col += 1;
        }
        col
    }

    /// Paints `w` cells starting at `(x, y)` with a blank on `bg`.
    pub fn fill(&mut self, x: u16, y: u16, w: u16, bg: Option<Color>) {
        let blank = Cell::text(' ', None, bg, false);
        for col in x..x.saturating_add(w).min(self.width) {
            self.set(col, y, blank);
        }
    }
}
