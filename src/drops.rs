// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::geometry::{entry_zone, Viewport};
use crate::settings::RainConfig;

/// Hard cap on live drops regardless of the configured quantity.
pub const MAX_DROPS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Raindrop {
    pub x: f32,
    pub y: f32,
    /// Snapshot of the configured length at spawn. Drawing uses the live config.
    pub length: f32,
    /// Snapshot of the configured speed at spawn. Motion uses the live config.
    pub speed: f32,
}

/// Builds a fresh set of drops scattered over the viewport. The caller swaps
/// the result in wholesale; nothing is carried over from the previous set.
pub fn populate<R: Rng + ?Sized>(
    viewport: Viewport,
    config: &RainConfig,
    rng: &mut R,
) -> Vec<Raindrop> {
    let zone = entry_zone(config.angle, viewport);
    let height = viewport.height as f32;
    let count = (config.quantity as usize).min(MAX_DROPS);
    let length = config.drop_length();
    let speed = config.drop_speed();

    (0..count)
        .map(|_| Raindrop {
            x: zone.sample(rng),
            y: rng.random::<f32>() * height,
            length,
            speed,
        })
        .collect()
}
