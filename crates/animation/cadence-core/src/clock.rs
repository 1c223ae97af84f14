//! Host frame and timer primitives.
//!
//! The engine never touches a display directly. A [`FrameClock`] stands in for
//! the host's "request next frame" and "schedule after N ms" services.

use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use tokio::time::Instant;

use crate::config::Config;

pub trait FrameClock {
    /// Current timestamp.
    fn now(&self) -> Instant;

    /// Resolves on the next display frame with that frame's timestamp.
    fn next_frame(&self) -> LocalBoxFuture<'_, Instant>;

    /// Resolves after `duration` of wall-clock time.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'_, ()>;
}

/// Frame clock backed by tokio timers, ticking at a fixed rate.
///
/// Under a paused tokio runtime (`start_paused = true`) frames advance on
/// virtual time, which keeps tests deterministic.
#[derive(Clone, Debug)]
pub struct IntervalClock {
    frame: Duration,
}

impl IntervalClock {
    pub fn new(frame: Duration) -> Self {
        Self { frame }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.frame_interval())
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl FrameClock for IntervalClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn next_frame(&self) -> LocalBoxFuture<'_, Instant> {
        async move {
            tokio::time::sleep(self.frame).await;
            Instant::now()
        }
        .boxed_local()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'_, ()> {
        tokio::time::sleep(duration).boxed_local()
    }
}

impl<C: FrameClock + ?Sized> FrameClock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn next_frame(&self) -> LocalBoxFuture<'_, Instant> {
        (**self).next_frame()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'_, ()> {
        (**self).sleep(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn frames_advance_by_interval() {
        let clock = IntervalClock::new(Duration::from_millis(10));
        let t0 = clock.now();
        let t1 = clock.next_frame().await;
        let t2 = clock.next_frame().await;
        assert!(t1 - t0 >= Duration::from_millis(10));
        assert!(t2 - t1 >= Duration::from_millis(10));
        assert!(t2 - t0 < Duration::from_millis(25));
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_waits_requested_duration() {
        let clock = IntervalClock::default();
        let t0 = clock.now();
        clock.sleep(Duration::from_millis(250)).await;
        let waited = clock.now() - t0;
        assert!(waited >= Duration::from_millis(250));
        assert!(waited < Duration::from_millis(255));
    }
}
