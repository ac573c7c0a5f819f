// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::runtime::Angle;

/// How far the tilted angles lean off vertical.
pub const TILT_DEGREES: f32 = 30.0;

/// Size of the drawing surface in surface pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub dx: f32,
    pub dy: f32,
}

impl Vec2 {
    #[allow(dead_code)]
    pub const ZERO: Vec2 = Vec2 { dx: 0.0, dy: 0.0 };

    #[allow(dead_code)]
    pub fn length(self) -> f32 {
        self.dx.hypot(self.dy)
    }
}

fn tilt_sin_cos() -> (f32, f32) {
    TILT_DEGREES.to_radians().sin_cos()
}

/// Scales the unit vector for `angle` by `magnitude`. Used both for the per-frame
/// motion of a drop and for the offset from its head to its tail.
pub fn displacement(angle: Angle, magnitude: f32) -> Vec2 {
    let (sin, cos) = tilt_sin_cos();
    match angle {
        Angle::Vertical => Vec2 {
            dx: 0.0,
            dy: magnitude,
        },
        Angle::Left => Vec2 {
            dx: -magnitude * sin,
            dy: magnitude * cos,
        },
        Angle::Right => Vec2 {
            dx: magnitude * sin,
            dy: magnitude * cos,
        },
    }
}

/// Horizontal span drops enter from. Tilted rain drifts sideways while it
/// falls, so the span is widened by `height * tan(30)` on the upwind side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntryZone {
    pub min: f32,
    pub max: f32,
}

impl EntryZone {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.min + rng.random::<f32>() * (self.max - self.min)
    }

    #[allow(dead_code)]
    pub fn contains(&self, x: f32) -> bool {
        x >= self.min && x <= self.max
    }
}

pub fn entry_extension(height: f32) -> f32 {
    let (sin, cos) = tilt_sin_cos();
    height * sin / cos
}

pub fn entry_zone(angle: Angle, viewport: Viewport) -> EntryZone {
    let width = viewport.width as f32;
    let extend = entry_extension(viewport.height as f32);
    match angle {
        Angle::Vertical => EntryZone {
            min: 0.0,
            max: width,
        },
        Angle::Left => EntryZone {
            min: 0.0,
            max: width + extend,
        },
        Angle::Right => EntryZone {
            min: -extend,
            max: width,
        },
    }
}
