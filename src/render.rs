// Copyright (c) 2026 rezky_nightky

use crate::drops::Raindrop;
use crate::geometry::{displacement, Viewport};
use crate::palette::Rgba;
use crate::settings::RainConfig;
use crate::surface::DrawContext;

/// Painted over the whole surface each frame instead of clearing it, so old
/// strokes fade out into trails.
pub const TRAIL_FILL: Rgba = Rgba::new(10, 10, 10, 0.12);

pub const GLOW_BLUR: f32 = 15.0;

/// Draws one frame. Drop state is only read.
pub fn draw(
    ctx: &mut dyn DrawContext,
    viewport: Viewport,
    drops: &[Raindrop],
    config: &RainConfig,
) {
    ctx.fill_rect(
        0.0,
        0.0,
        viewport.width as f32,
        viewport.height as f32,
        TRAIL_FILL,
    );

    let color = config.color.rgb();
    ctx.set_stroke_style(color);
    ctx.set_line_width(config.line_width());
    ctx.set_shadow(GLOW_BLUR, color);

    let tail = displacement(config.angle, config.drop_length());
    for d in drops {
        ctx.begin_path();
        ctx.move_to(d.x, d.y);
        ctx.line_to(d.x + tail.dx, d.y + tail.dy);
        ctx.stroke();
    }
}
