// Copyright (c) 2026 rezky_nightky

use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::drops::{populate, Raindrop};
use crate::geometry::{displacement, Viewport};
use crate::render::draw;
use crate::settings::RainConfig;
use crate::simulation::{advance, Bounds};
use crate::surface::Surface;

/// Ticket for one requested display frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The host's display-refresh primitive. A frame that was cancelled must never
/// be delivered; a stale handle that slips through is ignored by the driver.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

/// What a config update did to the running animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigEffect {
    Unchanged,
    Restyled,
    Repopulated,
}

/// Owns the live drops and the single outstanding frame request.
pub struct AnimationDriver {
    state: DriverState,
    config: RainConfig,
    viewport: Viewport,
    drops: Vec<Raindrop>,
    pending: Option<FrameHandle>,
    rng: StdRng,
    frames: u64,
}

impl AnimationDriver {
    pub fn new(config: RainConfig, rng: StdRng) -> Self {
        Self {
            state: DriverState::Idle,
            config,
            viewport: Viewport::default(),
            drops: Vec::new(),
            pending: None,
            rng,
            frames: 0,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    #[allow(dead_code)]
    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }

    #[allow(dead_code)]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[allow(dead_code)]
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Populates against the surface's current size and asks for the first
    /// frame. Does nothing, and reports `false`, when the surface has no
    /// drawing context.
    pub fn start(&mut self, surface: &mut dyn Surface, scheduler: &mut dyn FrameScheduler) -> bool {
        self.cancel_pending(scheduler);
        if surface.context().is_none() {
            debug!("surface unavailable, rain not started");
            self.state = DriverState::Idle;
            return false;
        }

        self.viewport = surface.viewport();
        self.drops = populate(self.viewport, &self.config, &mut self.rng);
        self.pending = Some(scheduler.request_frame());
        self.state = DriverState::Running;
        debug!(
            width = self.viewport.width,
            height = self.viewport.height,
            drops = self.drops.len(),
            angle = self.config.angle.as_str(),
            "rain started"
        );
        true
    }

    /// Runs one simulation + render step for `handle` and schedules the next
    /// frame. Frames that are not the outstanding request are dropped.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        surface: &mut dyn Surface,
        scheduler: &mut dyn FrameScheduler,
    ) -> bool {
        if self.state != DriverState::Running || self.pending != Some(handle) {
            trace!(?handle, "ignoring stale frame");
            return false;
        }
        self.pending = None;

        let Some(ctx) = surface.context() else {
            debug!("surface went away, rain idle");
            self.state = DriverState::Idle;
            return false;
        };

        let motion = displacement(self.config.angle, self.config.drop_speed());
        let bounds = Bounds::new(self.config.angle, self.viewport);
        let respawned = advance(&mut self.drops, motion, &bounds, &mut self.rng);
        draw(ctx, self.viewport, &self.drops, &self.config);

        self.frames = self.frames.wrapping_add(1);
        trace!(frame = self.frames, respawned, "frame");
        self.pending = Some(scheduler.request_frame());
        true
    }

    /// Swaps in `next`. Geometry changes restart the loop on a fresh drop set;
    /// a color change is picked up by the next render.
    pub fn on_config_change(
        &mut self,
        next: RainConfig,
        surface: &mut dyn Surface,
        scheduler: &mut dyn FrameScheduler,
    ) -> ConfigEffect {
        let prev = std::mem::replace(&mut self.config, next);
        if prev == next {
            return ConfigEffect::Unchanged;
        }
        if !prev.affects_geometry(&next) {
            debug!(color = next.color.name(), "restyled");
            return ConfigEffect::Restyled;
        }
        if self.state == DriverState::Running {
            self.start(surface, scheduler);
        }
        ConfigEffect::Repopulated
    }

    /// The surface changed size. An idle driver takes this as its cue to try
    /// starting, since the surface may only now have a context.
    pub fn on_resize(&mut self, surface: &mut dyn Surface, scheduler: &mut dyn FrameScheduler) {
        match self.state {
            DriverState::Running | DriverState::Idle => {
                self.start(surface, scheduler);
            }
            DriverState::Stopped => {}
        }
    }

    /// Cancels the outstanding frame. Safe to call more than once.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.cancel_pending(scheduler);
        if self.state != DriverState::Stopped {
            debug!(frames = self.frames, "rain stopped");
        }
        self.state = DriverState::Stopped;
    }

    fn cancel_pending(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(h) = self.pending.take() {
            scheduler.cancel_frame(h);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::geometry::entry_zone;
    use crate::palette::NeonColor;
    use crate::render::tests::{Op, Recorder};
    use crate::runtime::Angle;
    use crate::surface::DrawContext;

    struct TestSurface {
        viewport: Viewport,
        mounted: bool,
        ctx: Recorder,
    }

    impl TestSurface {
        fn new(width: u32, height: u32) -> Self {
            Self {
                viewport: Viewport::new(width, height),
                mounted: true,
                ctx: Recorder::default(),
            }
        }

        fn strokes(&self) -> usize {
            self.ctx.ops.iter().filter(|op| **op == Op::Stroke).count()
        }
    }

    impl Surface for TestSurface {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn context(&mut self) -> Option<&mut dyn DrawContext> {
            if self.mounted {
                Some(&mut self.ctx)
            } else {
                None
            }
        }
    }

    #[derive(Default)]
    struct ManualScheduler {
        next: u64,
        pending: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for ManualScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            let h = FrameHandle(self.next);
            self.pending.push(h);
            h
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.pending.retain(|&h| h != handle);
            self.cancelled.push(handle);
        }
    }

    fn driver(config: RainConfig) -> AnimationDriver {
        AnimationDriver::new(config, StdRng::seed_from_u64(99))
    }

    #[test]
    fn start_populates_and_requests_one_frame() {
        let mut surface = TestSurface::new(800, 600);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig::default());

        assert!(d.start(&mut surface, &mut sched));
        assert_eq!(d.state(), DriverState::Running);
        assert_eq!(d.drops().len(), 150);
        assert_eq!(sched.pending.len(), 1);
        assert_eq!(d.pending(), sched.pending.first().copied());
    }

    #[test]
    fn unmounted_surface_stays_idle() {
        let mut surface = TestSurface::new(800, 600);
        surface.mounted = false;
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig::default());

        assert!(!d.start(&mut surface, &mut sched));
        assert_eq!(d.state(), DriverState::Idle);
        assert!(d.drops().is_empty());
        assert!(sched.pending.is_empty());

        surface.mounted = true;
        d.on_resize(&mut surface, &mut sched);
        assert_eq!(d.state(), DriverState::Running);
        assert_eq!(d.drops().len(), 150);
    }

    #[test]
    fn each_frame_simulates_draws_and_reschedules() {
        let mut surface = TestSurface::new(800, 600);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig {
            quantity: 40,
            ..RainConfig::default()
        });
        d.start(&mut surface, &mut sched);
        let before = d.drops().to_vec();

        let h = sched.pending.pop().unwrap();
        assert!(d.on_frame(h, &mut surface, &mut sched));
        assert_eq!(surface.strokes(), 40);
        assert_eq!(d.frames(), 1);
        assert_eq!(sched.pending.len(), 1);
        assert_ne!(d.pending(), Some(h));

        let moved = before
            .iter()
            .zip(d.drops())
            .filter(|(a, b)| (b.y - a.y - 20.0).abs() < 1e-3)
            .count();
        assert!(moved > 30, "most drops should just fall 20px, got {moved}");
    }

    #[test]
    fn losing_the_context_mid_run_goes_idle() {
        let mut surface = TestSurface::new(400, 300);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig {
            quantity: 30,
            ..RainConfig::default()
        });
        d.start(&mut surface, &mut sched);
        let h = sched.pending.pop().unwrap();
        assert!(d.on_frame(h, &mut surface, &mut sched));
        assert_eq!(surface.strokes(), 30);
        let ops = surface.ctx.ops.len();

        surface.mounted = false;
        let h = sched.pending.pop().unwrap();
        assert!(!d.on_frame(h, &mut surface, &mut sched));
        assert_eq!(d.state(), DriverState::Idle);
        assert_eq!(surface.ctx.ops.len(), ops);
        assert!(sched.pending.is_empty());
        assert!(sched.cancelled.is_empty());
        assert_eq!(d.pending(), None);
        assert_eq!(d.frames(), 1);

        // The old handle is dead even once the context is back.
        surface.mounted = true;
        assert!(!d.on_frame(h, &mut surface, &mut sched));
        d.on_resize(&mut surface, &mut sched);
        assert_eq!(d.state(), DriverState::Running);
        assert_eq!(sched.pending.len(), 1);
    }

    #[test]
    fn stale_frame_is_ignored() {
        let mut surface = TestSurface::new(100, 100);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig::default());
        d.start(&mut surface, &mut sched);
        let first = sched.pending[0];

        d.on_config_change(
            RainConfig {
                quantity: 60,
                ..RainConfig::default()
            },
            &mut surface,
            &mut sched,
        );
        assert!(sched.cancelled.contains(&first));

        let snapshot = d.drops().to_vec();
        assert!(!d.on_frame(first, &mut surface, &mut sched));
        assert_eq!(d.drops(), snapshot.as_slice());
        assert!(surface.ctx.ops.is_empty());
    }

    #[test]
    fn geometry_change_repopulates() {
        let mut surface = TestSurface::new(800, 600);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig::default());
        d.start(&mut surface, &mut sched);

        let next = RainConfig {
            angle: Angle::Left,
            quantity: 300,
            ..RainConfig::default()
        };
        assert_eq!(
            d.on_config_change(next, &mut surface, &mut sched),
            ConfigEffect::Repopulated
        );
        assert_eq!(d.drops().len(), 300);
        let zone = entry_zone(Angle::Left, Viewport::new(800, 600));
        assert!(d.drops().iter().all(|p| zone.contains(p.x)));
        assert_eq!(sched.pending.len(), 1);
    }

    #[test]
    fn color_change_only_restyles() {
        let mut surface = TestSurface::new(800, 600);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig::default());
        d.start(&mut surface, &mut sched);
        let drops = d.drops().to_vec();
        let handle = d.pending();

        let next = RainConfig {
            color: NeonColor::Green,
            ..RainConfig::default()
        };
        assert_eq!(
            d.on_config_change(next, &mut surface, &mut sched),
            ConfigEffect::Restyled
        );
        assert_eq!(d.drops(), drops.as_slice());
        assert_eq!(d.pending(), handle);
        assert!(sched.cancelled.is_empty());

        d.on_frame(handle.unwrap(), &mut surface, &mut sched);
        assert!(surface
            .ctx
            .ops
            .contains(&Op::StrokeStyle(NeonColor::Green.rgb())));
    }

    #[test]
    fn same_config_is_unchanged() {
        let mut surface = TestSurface::new(10, 10);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig::default());
        d.start(&mut surface, &mut sched);
        assert_eq!(
            d.on_config_change(RainConfig::default(), &mut surface, &mut sched),
            ConfigEffect::Unchanged
        );
    }

    #[test]
    fn resize_repopulates_against_new_viewport() {
        let mut surface = TestSurface::new(800, 600);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig::default());
        d.start(&mut surface, &mut sched);

        surface.viewport = Viewport::new(80, 40);
        d.on_resize(&mut surface, &mut sched);
        assert_eq!(d.viewport(), Viewport::new(80, 40));
        assert!(d.drops().iter().all(|p| p.x <= 80.0 && p.y <= 40.0));
        assert_eq!(sched.pending.len(), 1);
    }

    #[test]
    fn stop_cancels_and_is_idempotent() {
        let mut surface = TestSurface::new(100, 100);
        let mut sched = ManualScheduler::default();
        let mut d = driver(RainConfig::default());
        d.start(&mut surface, &mut sched);
        let h = d.pending().unwrap();

        d.stop(&mut sched);
        d.stop(&mut sched);
        assert_eq!(d.state(), DriverState::Stopped);
        assert_eq!(sched.cancelled, vec![h]);
        assert!(sched.pending.is_empty());

        let snapshot = d.drops().to_vec();
        assert!(!d.on_frame(h, &mut surface, &mut sched));
        assert_eq!(d.drops(), snapshot.as_slice());

        d.on_resize(&mut surface, &mut sched);
        assert_eq!(d.state(), DriverState::Stopped);
    }
}
