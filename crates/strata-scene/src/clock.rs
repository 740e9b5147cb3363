//! Frame driver helper

use std::time::{Duration, Instant};

/// Turns host frame timestamps into clamped deltas for [`Scene::frame`].
///
/// [`Scene::frame`]: crate::Scene::frame
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    /// Delta since the previous tick. The first tick is zero.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last).min(self.max_delta),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        delta
    }

    /// Forget the previous timestamp, e.g. after the host was suspended.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
