// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::driver::{FrameHandle, FrameScheduler};

/// Fixed-rate stand-in for a display refresh. Holds at most one requested frame
/// and releases it once its slot comes up.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next_due: Instant,
    pending: Option<FrameHandle>,
    issued: u64,
}

impl Ticker {
    pub fn new(fps: f64, now: Instant) -> Self {
        Self {
            period: Duration::from_nanos((1e9 / fps.max(1.0)).round() as u64),
            next_due: now,
            pending: None,
            issued: 0,
        }
    }

    #[allow(dead_code)]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[allow(dead_code)]
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// How long the event loop may block before the pending frame is due.
    /// `None` when nothing was requested.
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        self.pending?;
        Some(self.next_due.saturating_duration_since(now))
    }

    /// Hands out the pending frame if its slot has arrived. A host that fell
    /// behind skips the missed slots instead of bursting through them.
    pub fn take_due(&mut self, now: Instant) -> Option<FrameHandle> {
        if now < self.next_due {
            return None;
        }
        let handle = self.pending.take()?;
        self.next_due += self.period;
        if now > self.next_due {
            self.next_due = now;
        }
        Some(handle)
    }
}

impl FrameScheduler for Ticker {
    fn request_frame(&mut self) -> FrameHandle {
        self.issued += 1;
        let handle = FrameHandle(self.issued);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn nothing_due_without_a_request() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(60.0, t0);
        assert_eq!(ticker.timeout(t0), None);
        assert_eq!(ticker.take_due(t0 + MS * 100), None);
    }

    #[test]
    fn frames_are_paced_by_the_period() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(50.0, t0);
        assert_eq!(ticker.period(), MS * 20);

        let first = ticker.request_frame();
        assert_eq!(ticker.take_due(t0), Some(first));

        let second = ticker.request_frame();
        assert_ne!(first, second);
        assert_eq!(ticker.timeout(t0 + MS * 5), Some(MS * 15));
        assert_eq!(ticker.take_due(t0 + MS * 19), None);
        assert_eq!(ticker.take_due(t0 + MS * 20), Some(second));
        assert_eq!(ticker.pending(), None);
    }

    #[test]
    fn cancelled_frames_are_never_delivered() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(60.0, t0);
        let h = ticker.request_frame();
        ticker.cancel_frame(FrameHandle(h.0 + 7));
        assert_eq!(ticker.pending(), Some(h));
        ticker.cancel_frame(h);
        assert_eq!(ticker.take_due(t0 + MS * 100), None);
    }

    #[test]
    fn late_host_does_not_burst() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(100.0, t0);
        ticker.request_frame();
        let late = t0 + MS * 500;
        assert!(ticker.take_due(late).is_some());

        // Fifty slots were missed; only one catch-up frame comes out.
        ticker.request_frame();
        assert!(ticker.take_due(late + MS).is_some());
        ticker.request_frame();
        assert_eq!(ticker.take_due(late + MS * 2), None);
        assert!(ticker.take_due(late + MS * 10).is_some());
    }
}
