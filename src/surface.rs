// Copyright (c) 2026 rezky_nightky

use crate::geometry::Viewport;
use crate::palette::{Rgb, Rgba};

/// Immediate-mode 2D drawing, in surface pixel coordinates.
pub trait DrawContext {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);
    fn set_stroke_style(&mut self, color: Rgb);
    fn set_line_width(&mut self, width: f32);
    /// Soft halo drawn around subsequent strokes. A blur of zero disables it.
    fn set_shadow(&mut self, blur: f32, color: Rgb);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn stroke(&mut self);
}

/// Whatever the rain is drawn onto. `context` is `None` while the surface has
/// nothing to draw into (not mounted yet, or zero-sized).
pub trait Surface {
    fn viewport(&self) -> Viewport;
    fn context(&mut self) -> Option<&mut dyn DrawContext>;
}
