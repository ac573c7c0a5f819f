// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::drops::Raindrop;
use crate::geometry::{entry_zone, EntryZone, Vec2, Viewport};
use crate::runtime::Angle;

/// Slack past each edge so the stroked tail is fully off-screen before a drop
/// is recycled.
const TOP_MARGIN: f32 = 30.0;
const BOTTOM_MARGIN: f32 = 20.0;
const SIDE_MARGIN: f32 = 20.0;

/// Respawned drops restart somewhere in `[RESPAWN_Y - RESPAWN_JITTER, RESPAWN_Y]`.
pub const RESPAWN_Y: f32 = -20.0;
pub const RESPAWN_JITTER: f32 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub height: f32,
    pub zone: EntryZone,
}

impl Bounds {
    pub fn new(angle: Angle, viewport: Viewport) -> Self {
        Self {
            height: viewport.height as f32,
            zone: entry_zone(angle, viewport),
        }
    }

    pub fn is_outside(&self, x: f32, y: f32) -> bool {
        y < -TOP_MARGIN
            || y > self.height + BOTTOM_MARGIN
            || x < self.zone.min - SIDE_MARGIN
            || x > self.zone.max + SIDE_MARGIN
    }
}

/// Moves every drop one tick along `motion` and recycles the ones that left
/// `bounds`. Recycled drops keep their length and speed and are not
/// re-checked until the next tick. Returns how many drops were recycled.
pub fn advance<R: Rng + ?Sized>(
    drops: &mut [Raindrop],
    motion: Vec2,
    bounds: &Bounds,
    rng: &mut R,
) -> usize {
    let mut respawned = 0usize;
    for d in drops.iter_mut() {
        d.x += motion.dx;
        d.y += motion.dy;
        if bounds.is_outside(d.x, d.y) {
            d.y = RESPAWN_Y - rng.random::<f32>() * RESPAWN_JITTER;
            d.x = bounds.zone.sample(rng);
            respawned += 1;
        }
    }
    respawned
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::geometry::displacement;

    fn drop_at(x: f32, y: f32) -> Raindrop {
        Raindrop {
            x,
            y,
            length: 16.0,
            speed: 20.0,
        }
    }

    #[test]
    fn zero_motion_inside_bounds_is_a_no_op() {
        let mut rng = StdRng::seed_from_u64(5);
        let bounds = Bounds::new(Angle::Vertical, Viewport::new(200, 100));
        let mut drops = [
            drop_at(50.0, 50.0),
            drop_at(0.0, -30.0),
            drop_at(200.0, 120.0),
        ];
        let before = drops;
        assert_eq!(advance(&mut drops, Vec2::ZERO, &bounds, &mut rng), 0);
        assert_eq!(drops, before);
    }

    #[test]
    fn drops_move_by_motion_vector() {
        let mut rng = StdRng::seed_from_u64(5);
        let vp = Viewport::new(800, 600);
        let bounds = Bounds::new(Angle::Left, vp);
        let motion = displacement(Angle::Left, 20.0);
        let mut drops = [drop_at(400.0, 100.0)];
        advance(&mut drops, motion, &bounds, &mut rng);
        assert!((drops[0].x - 390.0).abs() < 1e-3);
        assert!((drops[0].y - (100.0 + motion.dy)).abs() < 1e-3);
    }

    #[test]
    fn bottom_exit_respawns_above_the_top() {
        let mut rng = StdRng::seed_from_u64(9);
        let vp = Viewport::new(300, 200);
        let bounds = Bounds::new(Angle::Right, vp);
        let motion = displacement(Angle::Right, 6.0);
        let mut drops = vec![drop_at(100.0, 221.0); 64];

        assert_eq!(advance(&mut drops, motion, &bounds, &mut rng), 64);
        for d in &drops {
            assert!((-60.0..=-20.0).contains(&d.y), "y={}", d.y);
            assert!(bounds.zone.contains(d.x), "x={}", d.x);
            assert_eq!(d.length, 16.0);
            assert_eq!(d.speed, 20.0);
        }
    }

    #[test]
    fn each_edge_triggers_respawn() {
        let vp = Viewport::new(100, 100);
        let bounds = Bounds::new(Angle::Vertical, vp);
        assert!(bounds.is_outside(50.0, -30.5));
        assert!(bounds.is_outside(50.0, 120.5));
        assert!(bounds.is_outside(-20.5, 50.0));
        assert!(bounds.is_outside(120.5, 50.0));
        assert!(!bounds.is_outside(-20.0, -30.0));
        assert!(!bounds.is_outside(120.0, 120.0));
    }

    #[test]
    fn respawn_band_reaches_visible_area() {
        let mut rng = StdRng::seed_from_u64(21);
        let vp = Viewport::new(400, 300);
        let bounds = Bounds::new(Angle::Vertical, vp);
        let motion = displacement(Angle::Vertical, 34.0);
        let mut drops = vec![drop_at(10.0, 400.0); 32];
        advance(&mut drops, motion, &bounds, &mut rng);
        // Fast drops clear the top margin on the very next tick.
        assert_eq!(advance(&mut drops, motion, &bounds, &mut rng), 0);
        assert!(drops.iter().all(|d| d.y >= -30.0 && d.y <= 14.0));
    }
}
