// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Window title while the rain is up.
pub const WINDOW_TITLE: &str = "Lluvia App";

/// What the screen currently shows, so unchanged cells are never resent.
struct Shown {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

/// Attributes last sent to the terminal, so runs of equal style share one
/// escape sequence. Every draw ends with a reset, so a fresh pen is accurate.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

impl Pen {
    fn style(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<Shown>,
    run_buf: String,
    rows: Vec<Vec<usize>>,
}

fn leave(out: &mut Stdout) {
    let _ = out.execute(terminal::EndSynchronizedUpdate);
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            let _ = out.execute(terminal::SetTitle(WINDOW_TITLE));
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            leave(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
            rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Sends whatever changed in `frame` since the last call, then marks the
    /// frame clean.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size_changed = self
            .shown
            .as_ref()
            .map_or(true, |s| s.width != frame.width || s.height != frame.height);

        let total = frame.width as usize * frame.height as usize;
        let mostly_dirty = total > 0 && frame.dirty_indices().len() >= total / 3;

        self.stdout.queue(terminal::BeginSynchronizedUpdate)?;
        if size_changed || frame.is_dirty_all() || mostly_dirty {
            self.repaint(frame, size_changed)?;
        } else {
            self.patch(frame)?;
        }
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(terminal::EndSynchronizedUpdate)?;
        self.stdout.flush()?;

        frame.clear_dirty();
        Ok(())
    }

    fn repaint(&mut self, frame: &Frame, size_changed: bool) -> Result<()> {
        if size_changed {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }
        let shown = self.shown.insert(Shown {
            width: frame.width,
            height: frame.height,
            cells: Vec::with_capacity(frame.width as usize * frame.height as usize),
        });

        let mut pen = Pen::default();
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.style(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
                shown.cells.push(cell);
            }
        }
        Ok(())
    }

    /// Rewrites only dirty cells, coalescing horizontal neighbours of the same
    /// style into a single print.
    fn patch(&mut self, frame: &Frame) -> Result<()> {
        let Some(shown) = self.shown.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;

        if self.rows.len() != frame.height as usize {
            self.rows = vec![Vec::new(); frame.height as usize];
        }
        for &idx in frame.dirty_indices() {
            if let Some(row) = self.rows.get_mut(idx / width) {
                row.push(idx);
            }
        }

        let mut pen = Pen::default();
        for (y, row) in self.rows.iter_mut().enumerate() {
            if row.is_empty() {
                continue;
            }
            row.sort_unstable();

            let mut i = 0;
            while i < row.len() {
                let start = row[i];
                let cell = frame.cell_at_index(start);
                if shown.cells[start] == cell {
                    i += 1;
                    continue;
                }
                shown.cells[start] = cell;

                self.run_buf.clear();
                self.run_buf.push(cell.ch);
                let mut end = start;
                let mut j = i + 1;
                while j < row.len() && row[j] == end + 1 {
                    let next = frame.cell_at_index(row[j]);
                    if shown.cells[row[j]] == next
                        || next.fg != cell.fg
                        || next.bg != cell.bg
                        || next.bold != cell.bold
                    {
                        break;
                    }
                    shown.cells[row[j]] = next;
                    self.run_buf.push(next.ch);
                    end = row[j];
                    j += 1;
                }

                let x = (start % width) as u16;
                let y = y as u16;
                if pen.pos != Some((x, y)) {
                    self.stdout.queue(cursor::MoveTo(x, y))?;
                }
                pen.style(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                let next_x = (end % width) as u16 + 1;
                pen.pos = (next_x < frame.width).then_some((next_x, y));

                i = j;
            }
            row.clear();
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        leave(&mut self.stdout);
    }
}

/// Puts the terminal back into a usable state from anywhere, e.g. a panic hook
/// or signal handler that has no access to the `Terminal`.
pub fn restore_terminal_best_effort() {
    leave(&mut stdout());
}

#[cfg(test)]
mod tests {
    use crossterm::Command;

    use super::*;

    #[test]
    fn title_is_sent_as_an_osc_sequence() {
        let mut ansi = String::new();
        terminal::SetTitle(WINDOW_TITLE)
            .write_ansi(&mut ansi)
            .unwrap();
        assert_eq!(ansi, "\x1b]0;Lluvia App\x07");
    }
}
