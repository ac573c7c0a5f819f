// Copyright (c) 2026 rezky_nightky

//! Software raster the rain is drawn on. One canvas pixel covers
//! `PIXEL_SIZE x PIXEL_SIZE` surface pixels and a terminal cell holds two
//! canvas pixels stacked vertically, so a cell is 8 surface pixels wide and 16
//! tall, about the shape of a real terminal glyph.

use crate::cell::Cell;
use crate::frame::Frame;
use crate::geometry::Viewport;
use crate::palette::{terminal_color, Rgb, Rgba};
use crate::runtime::ColorMode;
use crate::surface::{DrawContext, Surface};

pub const PIXEL_SIZE: u32 = 8;
pub const PIXELS_PER_COLUMN: u32 = PIXEL_SIZE;
pub const PIXELS_PER_ROW: u32 = PIXEL_SIZE * 2;

/// Color of a freshly created canvas; also what the trail fill fades towards.
pub const BACKGROUND: Rgb = Rgb::new(10, 10, 10);

/// Peak opacity of the halo right next to a stroke.
const GLOW_STRENGTH: f32 = 0.55;

/// Pixels dimmer than this count as dark on mono terminals.
const MONO_LIT_LUMA: u8 = 48;

#[derive(Clone, Debug)]
struct Halo {
    blur: f32,
    /// `(dx, dy, alpha)` offsets around a lit pixel.
    kernel: Vec<(i32, i32, f32)>,
}

impl Halo {
    fn new(blur: f32) -> Self {
        // A canvas-style shadow blur is twice the Gaussian sigma.
        let sigma = blur / 2.0 / PIXEL_SIZE as f32;
        let mut kernel = Vec::new();
        if sigma > 0.0 {
            let radius = (sigma * 2.0).ceil() as i32;
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let d2 = (dx * dx + dy * dy) as f32;
                    let a = GLOW_STRENGTH * (-d2 / (2.0 * sigma * sigma)).exp();
                    if a >= 0.01 {
                        kernel.push((dx, dy, a));
                    }
                }
            }
        }
        Self { blur, kernel }
    }
}

pub struct Canvas {
    cols: u16,
    rows: u16,
    width: usize,
    height: usize,
    pixels: Vec<[f32; 3]>,

    stroke_color: [f32; 3],
    line_width: f32,
    shadow_color: [f32; 3],
    halo: Halo,

    cursor: Option<(f32, f32)>,
    segments: Vec<((f32, f32), (f32, f32))>,

    // Scratch for one stroke: covered pixels and per-pixel halo alpha.
    lit: Vec<usize>,
    glow: Vec<f32>,
    glow_touched: Vec<usize>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let width = cols as usize;
        let height = rows as usize * 2;
        let len = width * height;
        Self {
            cols,
            rows,
            width,
            height,
            pixels: vec![BACKGROUND.to_f32(); len],
            stroke_color: [0.0; 3],
            line_width: 1.0,
            shadow_color: [0.0; 3],
            halo: Halo::new(0.0),
            cursor: None,
            segments: Vec::new(),
            lit: Vec::new(),
            glow: vec![0.0; len],
            glow_touched: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.cols as u32 * PIXELS_PER_COLUMN,
            self.rows as u32 * PIXELS_PER_ROW,
        )
    }

    /// Canvas pixel at raster coordinates, or `None` outside the canvas.
    #[cfg(test)]
    pub fn pixel(&self, px: usize, py: usize) -> Option<Rgb> {
        if px >= self.width || py >= self.height {
            return None;
        }
        Some(Rgb::from_f32(self.pixels[py * self.width + px]))
    }

    fn raster_index(&self, px: i32, py: i32) -> Option<usize> {
        if px < 0 || py < 0 || px as usize >= self.width || py as usize >= self.height {
            return None;
        }
        Some(py as usize * self.width + px as usize)
    }

    fn rasterize_segment(&mut self, from: (f32, f32), to: (f32, f32), thickness: i32) {
        let scale = PIXEL_SIZE as f32;
        let (x0, y0) = (from.0 / scale, from.1 / scale);
        let (x1, y1) = (to.0 / scale, to.1 / scale);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as i32;
        let half = (thickness - 1) / 2;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let cx = (x0 + (x1 - x0) * t).floor() as i32;
            let cy = (y0 + (y1 - y0) * t).floor() as i32;
            for oy in -half..thickness - half {
                for ox in -half..thickness - half {
                    if let Some(idx) = self.raster_index(cx + ox, cy + oy) {
                        self.lit.push(idx);
                    }
                }
            }
        }
    }

    fn composite_halo(&mut self) {
        for &idx in &self.lit {
            let px = (idx % self.width) as i32;
            let py = (idx / self.width) as i32;
            for &(dx, dy, a) in &self.halo.kernel {
                let (nx, ny) = (px + dx, py + dy);
                if nx < 0 || ny < 0 || nx as usize >= self.width || ny as usize >= self.height {
                    continue;
                }
                let n = ny as usize * self.width + nx as usize;
                if self.glow[n] == 0.0 {
                    self.glow_touched.push(n);
                }
                if a > self.glow[n] {
                    self.glow[n] = a;
                }
            }
        }

        for &n in &self.glow_touched {
            let a = self.glow[n];
            let p = &mut self.pixels[n];
            for (ch, c) in p.iter_mut().zip(self.shadow_color) {
                *ch = *ch * (1.0 - a) + c * a;
            }
            self.glow[n] = 0.0;
        }
        self.glow_touched.clear();
    }

    /// Copies the canvas into `frame`, two pixels per cell.
    pub fn present(&self, frame: &mut Frame, mode: ColorMode) {
        let rows = self.rows.min(frame.height);
        let cols = self.cols.min(frame.width);
        for row in 0..rows {
            for col in 0..cols {
                let px = col as usize;
                let top = Rgb::from_f32(self.pixels[row as usize * 2 * self.width + px]);
                let bottom = Rgb::from_f32(self.pixels[(row as usize * 2 + 1) * self.width + px]);
                let cell = if mode == ColorMode::Mono {
                    Cell::mono_blocks(top.luma() >= MONO_LIT_LUMA, bottom.luma() >= MONO_LIT_LUMA)
                } else {
                    Cell::half_blocks(terminal_color(top, mode), terminal_color(bottom, mode))
                };
                frame.set(col, row, cell);
            }
        }
    }
}

impl DrawContext for Canvas {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let scale = PIXEL_SIZE as f32;
        let x0 = (x / scale).floor().clamp(0.0, self.width as f32) as usize;
        let x1 = ((x + w) / scale).ceil().clamp(0.0, self.width as f32) as usize;
        let y0 = (y / scale).floor().clamp(0.0, self.height as f32) as usize;
        let y1 = ((y + h) / scale).ceil().clamp(0.0, self.height as f32) as usize;
        let a = color.a.clamp(0.0, 1.0);
        let c = color.rgb.to_f32();
        if x1 <= x0 {
            return;
        }

        for py in y0..y1 {
            let row = &mut self.pixels[py * self.width + x0..py * self.width + x1];
            for p in row {
                for (ch, src) in p.iter_mut().zip(c) {
                    *ch = *ch * (1.0 - a) + src * a;
                }
            }
        }
    }

    fn set_stroke_style(&mut self, color: Rgb) {
        self.stroke_color = color.to_f32();
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn set_shadow(&mut self, blur: f32, color: Rgb) {
        self.shadow_color = color.to_f32();
        if self.halo.blur != blur {
            self.halo = Halo::new(blur.max(0.0));
        }
    }

    fn begin_path(&mut self) {
        self.cursor = None;
        self.segments.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.cursor = Some((x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if let Some(from) = self.cursor {
            self.segments.push((from, (x, y)));
        }
        self.cursor = Some((x, y));
    }

    /// Lines narrower than a canvas pixel cover one pixel column partially,
    /// so they are blended in with `line_width / PIXEL_SIZE` opacity.
    fn stroke(&mut self) {
        let scaled = self.line_width.max(0.0) / PIXEL_SIZE as f32;
        let thickness = scaled.round().max(1.0) as i32;
        let coverage = scaled.min(1.0);
        self.lit.clear();
        let segments = std::mem::take(&mut self.segments);
        for &(from, to) in &segments {
            self.rasterize_segment(from, to, thickness);
        }
        self.segments = segments;
        self.lit.sort_unstable();
        self.lit.dedup();

        if !self.halo.kernel.is_empty() {
            self.composite_halo();
        }
        for &idx in &self.lit {
            let p = &mut self.pixels[idx];
            for (ch, c) in p.iter_mut().zip(self.stroke_color) {
                *ch = *ch * (1.0 - coverage) + c * coverage;
            }
        }
    }
}

/// The host surface: a canvas once the terminal has a usable size.
#[derive(Default)]
pub struct Screen {
    canvas: Option<Canvas>,
}

impl Screen {
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut s = Self::default();
        s.resize(cols, rows);
        s
    }

    /// Replaces the canvas; like a resized browser canvas the old picture is
    /// dropped. A zero dimension unmounts it.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.canvas = if cols == 0 || rows == 0 {
            None
        } else {
            Some(Canvas::new(cols, rows))
        };
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }
}

impl Surface for Screen {
    fn viewport(&self) -> Viewport {
        self.canvas
            .as_ref()
            .map(Canvas::viewport)
            .unwrap_or_default()
    }

    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        self.canvas.as_mut().map(|c| c as &mut dyn DrawContext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TRAIL_FILL;

    fn lit_pixels(c: &Canvas, color: Rgb) -> usize {
        let mut n = 0;
        for py in 0..c.height {
            for px in 0..c.width {
                if c.pixel(px, py) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn viewport_matches_cell_geometry() {
        let c = Canvas::new(80, 24);
        assert_eq!(c.viewport(), Viewport::new(640, 384));
        assert_eq!(c.pixel(79, 47), Some(BACKGROUND));
        assert_eq!(c.pixel(80, 0), None);
    }

    #[test]
    fn trail_fill_fades_strokes_towards_background() {
        let mut c = Canvas::new(4, 2);
        c.set_stroke_style(Rgb::new(255, 255, 255));
        c.set_line_width(8.0);
        c.set_shadow(0.0, Rgb::new(255, 255, 255));
        c.begin_path();
        c.move_to(4.0, 4.0);
        c.line_to(4.0, 5.0);
        c.stroke();
        assert_eq!(c.pixel(0, 0), Some(Rgb::new(255, 255, 255)));

        let vp = c.viewport();
        c.fill_rect(0.0, 0.0, vp.width as f32, vp.height as f32, TRAIL_FILL);
        let once = c.pixel(0, 0).unwrap();
        assert_eq!(once, Rgb::new(226, 226, 226));

        for _ in 0..200 {
            c.fill_rect(0.0, 0.0, vp.width as f32, vp.height as f32, TRAIL_FILL);
        }
        assert_eq!(c.pixel(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn vertical_stroke_covers_its_length() {
        let mut c = Canvas::new(10, 10);
        let cyan = Rgb::new(0, 255, 255);
        c.set_stroke_style(cyan);
        c.set_line_width(8.0);
        c.set_shadow(0.0, cyan);
        c.begin_path();
        c.move_to(20.0, 16.0);
        c.line_to(20.0, 48.0);
        c.stroke();
        // 16..48 surface px is canvas rows 2..=6 in column 2.
        for py in 2..=6 {
            assert_eq!(c.pixel(2, py), Some(cyan), "row {py}");
        }
        assert_eq!(lit_pixels(&c, cyan), 5);
    }

    fn stroked_with_width(width: f32) -> Canvas {
        let mut c = Canvas::new(10, 10);
        c.set_stroke_style(Rgb::new(255, 255, 255));
        c.set_line_width(width);
        c.set_shadow(0.0, Rgb::new(255, 255, 255));
        c.begin_path();
        c.move_to(36.0, 16.0);
        c.line_to(36.0, 48.0);
        c.stroke();
        c
    }

    #[test]
    fn line_width_changes_how_strong_a_stroke_looks() {
        let thin = stroked_with_width(1.0).pixel(4, 4).unwrap();
        let mid = stroked_with_width(4.0).pixel(4, 4).unwrap();
        let full = stroked_with_width(8.0).pixel(4, 4).unwrap();

        assert_eq!(full, Rgb::new(255, 255, 255));
        assert!(thin.r > BACKGROUND.r && thin.r < mid.r, "{thin:?} {mid:?}");
        assert!(mid.r < full.r, "{mid:?}");
        // 1/8 coverage of white over the background.
        assert_eq!(thin, Rgb::new(41, 41, 41));
    }

    #[test]
    fn wide_lines_cover_more_than_one_column() {
        let white = Rgb::new(255, 255, 255);
        let narrow = stroked_with_width(8.0);
        let wide = stroked_with_width(16.0);
        assert_eq!(lit_pixels(&narrow, white), 5);
        // Two columns, one extra row below the end.
        assert_eq!(lit_pixels(&wide, white), 12);
        assert_eq!(wide.pixel(5, 4), Some(white));
        assert_eq!(narrow.pixel(5, 4), Some(BACKGROUND));
    }

    #[test]
    fn overlapping_segments_blend_once() {
        let mut c = Canvas::new(4, 4);
        c.set_stroke_style(Rgb::new(255, 255, 255));
        c.set_line_width(4.0);
        c.set_shadow(0.0, Rgb::new(255, 255, 255));
        c.begin_path();
        c.move_to(4.0, 4.0);
        c.line_to(4.0, 5.0);
        c.line_to(4.0, 4.0);
        c.stroke();
        // Half coverage: 10 * 0.5 + 255 * 0.5.
        assert_eq!(c.pixel(0, 0), Some(Rgb::new(133, 133, 133)));
    }

    #[test]
    fn glow_tints_neighbours_but_not_far_pixels() {
        let mut c = Canvas::new(12, 6);
        let pink = Rgb::new(255, 16, 240);
        c.set_stroke_style(pink);
        c.set_line_width(8.0);
        c.set_shadow(15.0, pink);
        c.begin_path();
        c.move_to(48.0, 48.0);
        c.line_to(48.0, 49.0);
        c.stroke();

        assert_eq!(c.pixel(6, 6), Some(pink));
        let near = c.pixel(7, 6).unwrap();
        assert!(near.r > BACKGROUND.r + 40 && near.r < pink.r, "{near:?}");
        let diag = c.pixel(7, 7).unwrap();
        assert!(diag.r < near.r && diag.r > BACKGROUND.r);
        assert_eq!(c.pixel(10, 6), Some(BACKGROUND));
    }

    #[test]
    fn strokes_off_canvas_are_clipped() {
        let mut c = Canvas::new(4, 4);
        let red = Rgb::new(255, 7, 58);
        c.set_stroke_style(red);
        c.set_shadow(15.0, red);
        c.begin_path();
        c.move_to(-100.0, -60.0);
        c.line_to(-80.0, -30.0);
        c.stroke();
        assert_eq!(lit_pixels(&c, BACKGROUND), 32);
    }

    #[test]
    fn present_packs_two_pixels_per_cell() {
        let mut c = Canvas::new(2, 1);
        let white = Rgb::new(255, 255, 255);
        c.set_stroke_style(white);
        c.set_line_width(8.0);
        c.set_shadow(0.0, white);
        c.begin_path();
        c.move_to(1.0, 9.0);
        c.line_to(1.0, 10.0);
        c.stroke();

        let mut f = Frame::new(2, 1);
        c.present(&mut f, ColorMode::Mono);
        assert_eq!(f.get(0, 0).unwrap().ch, crate::cell::LOWER_HALF);
        assert_eq!(f.get(1, 0).unwrap().ch, ' ');

        c.present(&mut f, ColorMode::TrueColor);
        let cell = f.get(0, 0).unwrap();
        assert_eq!(cell.ch, crate::cell::UPPER_HALF);
        assert_eq!(
            cell.bg,
            Some(crossterm::style::Color::Rgb {
                r: 255,
                g: 255,
                b: 255
            })
        );
    }

    #[test]
    fn screen_without_size_has_no_context() {
        let mut s = Screen::new(0, 10);
        assert!(s.context().is_none());
        assert_eq!(s.viewport(), Viewport::default());

        s.resize(3, 2);
        assert!(s.context().is_some());
        assert_eq!(s.viewport(), Viewport::new(24, 32));
    }
}
