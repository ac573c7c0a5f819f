// Copyright (c) 2026 rezky_nightky

//! Keyboard-driven settings overlay drawn on top of the rain.

use crossterm::event::KeyCode;
use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{terminal_color, NeonColor, Rgb};
use crate::runtime::{Angle, ColorMode};
use crate::settings::{
    snap_quantity, RainConfig, DROP_SIZE_MAX, DROP_SIZE_MIN, QUANTITY_MAX, QUANTITY_MIN,
    QUANTITY_STEP, SPEED_MAX, SPEED_MIN,
};

pub const PANEL_WIDTH: u16 = 32;
const SWATCH_COLUMNS: usize = 4;

const PANEL_BG: Rgb = Rgb::new(24, 24, 27);
const TEXT: Rgb = Rgb::new(228, 228, 231);
const MUTED: Rgb = Rgb::new(113, 113, 122);
const TRACK: Rgb = Rgb::new(63, 63, 70);
const ON_ACCENT: Rgb = Rgb::new(0, 0, 0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelRow {
    #[default]
    Angle,
    DropSize,
    Color,
    Quantity,
    Speed,
}

impl PanelRow {
    pub const ALL: [PanelRow; 5] = [
        PanelRow::Angle,
        PanelRow::DropSize,
        PanelRow::Color,
        PanelRow::Quantity,
        PanelRow::Speed,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// One user edit. Numeric payloads are raw requests and may be out of range;
/// `apply` clamps them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    SetAngle(Angle),
    SetDropSize(i32),
    SetColor(NeonColor),
    SetQuantity(i32),
    SetSpeed(i32),
}

impl PanelAction {
    /// The config after this edit. Every other field is carried over.
    pub fn apply(self, prev: &RainConfig) -> RainConfig {
        let mut next = *prev;
        match self {
            PanelAction::SetAngle(a) => next.angle = a,
            PanelAction::SetDropSize(v) => {
                next.drop_size = v.clamp(DROP_SIZE_MIN as i32, DROP_SIZE_MAX as i32) as u8;
            }
            PanelAction::SetColor(c) => next.color = c,
            PanelAction::SetQuantity(v) => {
                next.quantity = snap_quantity(v.clamp(0, QUANTITY_MAX as i32) as u32);
            }
            PanelAction::SetSpeed(v) => {
                next.speed = v.clamp(SPEED_MIN as i32, SPEED_MAX as i32) as u8;
            }
        }
        next
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Panel {
    pub open: bool,
    pub focus: PanelRow,
}

impl Panel {
    /// Feeds a key press to the panel. Returns the edit it asks for, if any.
    /// Color digits work even while the panel is closed.
    pub fn handle_key(&mut self, code: KeyCode, config: &RainConfig) -> Option<PanelAction> {
        match code {
            KeyCode::Char('c') | KeyCode::Tab => {
                self.open = !self.open;
                return None;
            }
            KeyCode::Char(d @ '1'..='8') => {
                let i = d as usize - '1' as usize;
                return NeonColor::from_index(i).map(PanelAction::SetColor);
            }
            _ => {}
        }

        if !self.open {
            return None;
        }

        match code {
            KeyCode::Up => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Down => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::Left => Some(self.adjust(config, -1)),
            KeyCode::Right => Some(self.adjust(config, 1)),
            _ => None,
        }
    }

    fn adjust(&self, config: &RainConfig, dir: i32) -> PanelAction {
        match self.focus {
            PanelRow::Angle => {
                let order = Angle::PANEL_ORDER;
                let i = order.iter().position(|a| *a == config.angle).unwrap_or(1) as i32;
                let j = (i + dir).clamp(0, order.len() as i32 - 1);
                PanelAction::SetAngle(order[j as usize])
            }
            PanelRow::DropSize => PanelAction::SetDropSize(config.drop_size as i32 + dir),
            PanelRow::Color => {
                let last = NeonColor::ALL.len() as i32 - 1;
                let j = (config.color.index() as i32 + dir).clamp(0, last);
                PanelAction::SetColor(NeonColor::ALL[j as usize])
            }
            PanelRow::Quantity => {
                PanelAction::SetQuantity(config.quantity as i32 + dir * QUANTITY_STEP as i32)
            }
            PanelRow::Speed => PanelAction::SetSpeed(config.speed as i32 + dir),
        }
    }

    pub fn width_for(frame_width: u16) -> u16 {
        PANEL_WIDTH.min((frame_width as u32 * 9 / 10) as u16)
    }

    /// Draws the panel, or just the button that opens it, into the top-right
    /// corner of `frame`.
    pub fn draw(&self, frame: &mut Frame, config: &RainConfig, mode: ColorMode) {
        let c = |rgb: Rgb| terminal_color(rgb, mode);
        let accent = config.color.rgb();

        if !self.open {
            let label = " Settings [c] ";
            let w = label.chars().count() as u16;
            let x = frame.width.saturating_sub(w + 1);
            frame.put_str(x, 0, label, w, c(TEXT), c(PANEL_BG), false);
            return;
        }

        let w = Self::width_for(frame.width);
        if w < 4 {
            return;
        }
        let x0 = frame.width.saturating_sub(w + 1);
        let inner_x = x0 + 2;
        let inner_w = w - 4;
        let mut y = 1;

        let blank = |frame: &mut Frame, y: &mut u16| {
            frame.fill(x0, *y, w, c(PANEL_BG));
            *y += 1;
        };

        blank(frame, &mut y);
        frame.fill(x0, y, w, c(PANEL_BG));
        frame.put_str(inner_x, y, "Settings", inner_w, c(TEXT), c(PANEL_BG), true);
        let close = "[c] close";
        let close_w = close.len() as u16;
        if inner_w > close_w + 9 {
            let cx = inner_x + inner_w - close_w;
            frame.put_str(cx, y, close, close_w, c(MUTED), c(PANEL_BG), false);
        }
        y += 1;
        blank(frame, &mut y);

        // Angle
        self.label(frame, x0, w, y, PanelRow::Angle, "Angle", None, mode);
        y += 1;
        frame.fill(x0, y, w, c(PANEL_BG));
        let button_w = inner_w / 3;
        for (i, angle) in Angle::PANEL_ORDER.iter().enumerate() {
            let text = format!("{} {}", angle.icon(), angle.label());
            let bx = inner_x + i as u16 * button_w;
            let selected = *angle == config.angle;
            let (fg, bg) = if selected {
                (c(ON_ACCENT), c(accent))
            } else {
                (c(TEXT), c(TRACK))
            };
            frame.fill(bx, y, button_w.saturating_sub(1), bg);
            let shown = if mode == ColorMode::Mono && selected {
                format!(">{text}")
            } else {
                text
            };
            frame.put_str(bx, y, &shown, button_w.saturating_sub(1), fg, bg, selected);
        }
        y += 1;
        blank(frame, &mut y);

        // Drop size
        let v = config.drop_size.to_string();
        self.label(
            frame,
            x0,
            w,
            y,
            PanelRow::DropSize,
            "Drop size",
            Some(&v),
            mode,
        );
        y += 1;
        slider(
            frame,
            (x0, w, inner_x, inner_w),
            y,
            (
                config.drop_size as u32,
                DROP_SIZE_MIN as u32,
                DROP_SIZE_MAX as u32,
            ),
            accent,
            mode,
        );
        y += 1;
        blank(frame, &mut y);

        // Color swatches
        self.label(frame, x0, w, y, PanelRow::Color, "Color", None, mode);
        y += 1;
        let swatch_w = inner_w / SWATCH_COLUMNS as u16;
        for row in NeonColor::ALL.chunks(SWATCH_COLUMNS) {
            frame.fill(x0, y, w, c(PANEL_BG));
            for (i, color) in row.iter().enumerate() {
                let sx = inner_x + i as u16 * swatch_w;
                let sw = swatch_w.saturating_sub(1);
                let selected = *color == config.color;
                frame.fill(sx, y, sw, c(color.rgb()));
                let digit = (b'1' + color.index() as u8) as char;
                let mark = if selected {
                    format!("[{digit}]")
                } else {
                    format!(" {digit} ")
                };
                let mx = sx + sw.saturating_sub(3) / 2;
                frame.put_str(
                    mx,
                    y,
                    &mark,
                    sw.min(3),
                    c(ON_ACCENT),
                    c(color.rgb()),
                    selected,
                );
            }
            y += 1;
        }
        frame.fill(x0, y, w, c(PANEL_BG));
        let name = format!("{}  {}", config.color.name(), config.color.hex());
        frame.put_str(inner_x, y, &name, inner_w, c(accent), c(PANEL_BG), false);
        y += 1;
        blank(frame, &mut y);

        // Quantity
        let v = config.quantity.to_string();
        self.label(
            frame,
            x0,
            w,
            y,
            PanelRow::Quantity,
            "Quantity",
            Some(&v),
            mode,
        );
        y += 1;
        slider(
            frame,
            (x0, w, inner_x, inner_w),
            y,
            (config.quantity, QUANTITY_MIN, QUANTITY_MAX),
            accent,
            mode,
        );
        y += 1;
        blank(frame, &mut y);

        // Speed
        let v = config.speed.to_string();
        self.label(frame, x0, w, y, PanelRow::Speed, "Speed", Some(&v), mode);
        y += 1;
        slider(
            frame,
            (x0, w, inner_x, inner_w),
            y,
            (config.speed as u32, SPEED_MIN as u32, SPEED_MAX as u32),
            accent,
            mode,
        );
        y += 1;
        blank(frame, &mut y);

        frame.fill(x0, y, w, c(PANEL_BG));
        frame.put_str(
            inner_x,
            y,
            "\u{2191}\u{2193} row  \u{2190}\u{2192} adjust  1-8 color",
            inner_w,
            c(MUTED),
            c(PANEL_BG),
            false,
        );
        y += 1;
        blank(frame, &mut y);
    }

    #[allow(clippy::too_many_arguments)]
    fn label(
        &self,
        frame: &mut Frame,
        x0: u16,
        w: u16,
        y: u16,
        row: PanelRow,
        text: &str,
        value: Option<&str>,
        mode: ColorMode,
    ) {
        let c = |rgb: Rgb| terminal_color(rgb, mode);
        let focused = self.focus == row;
        frame.fill(x0, y, w, c(PANEL_BG));
        let marker = if focused { "\u{25b8} " } else { "  " };
        let fg = if focused { TEXT } else { MUTED };
        let end = frame.put_str(x0, y, marker, 2, c(TEXT), c(PANEL_BG), false);
        frame.put_str(
            end,
            y,
            text,
            w.saturating_sub(4),
            c(fg),
            c(PANEL_BG),
            focused,
        );
        if let Some(value) = value {
            let vw = value.len() as u16;
            let vx = (x0 + w).saturating_sub(vw + 2);
            frame.put_str(vx, y, value, vw, c(TEXT), c(PANEL_BG), true);
        }
    }
}

/// `(x0, w, inner_x, inner_w)` is the panel box and its padded content area;
/// `(value, min, max)` positions the knob.
fn slider(
    frame: &mut Frame,
    (x0, w, inner_x, inner_w): (u16, u16, u16, u16),
    y: u16,
    (value, min, max): (u32, u32, u32),
    accent: Rgb,
    mode: ColorMode,
) {
    let c = |rgb: Rgb| terminal_color(rgb, mode);
    frame.fill(x0, y, w, c(PANEL_BG));
    if inner_w == 0 {
        return;
    }
    let span = max.saturating_sub(min).max(1) as f32;
    let t = (value.clamp(min, max) - min) as f32 / span;
    let knob = (t * (inner_w - 1) as f32).round() as u16;
    for i in 0..inner_w {
        let (ch, fg): (char, Option<Color>) = if i < knob {
            ('\u{2501}', c(accent))
        } else if i == knob {
            ('\u{25cf}', c(accent))
        } else {
            ('\u{2500}', c(TRACK))
        };
        frame.set(inner_x + i, y, Cell::text(ch, fg, c(PANEL_BG), false));
    }
}
