//! Frame driver: ramps a progress value from 0 to 1 over wall-clock time,
//! one step per display frame.
//!
//! Per frame: `on_update`, then every unfired checkpoint at or below the
//! current progress (ascending), then `on_complete` once progress reaches 1.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::checkpoints::Checkpoints;
use crate::clock::FrameClock;
use crate::error::Hook;
use crate::guard::Reporter;
use crate::math::factor_in;

/// Progress of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Linear fraction in `[0, 1]`.
    pub progress: f64,
    /// Elapsed seconds since the run started.
    pub time: f64,
}

/// Stop switch shared between a run and its owner.
#[derive(Clone, Debug)]
pub struct RunHandle {
    running: Rc<Cell<bool>>,
}

impl RunHandle {
    fn new() -> Self {
        Self {
            running: Rc::new(Cell::new(true)),
        }
    }

    /// The next frame becomes a no-op and the run ends. Already fired
    /// callbacks are not rolled back.
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    Completed,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverOutcome {
    Completed,
    Stopped,
}

type StateFn<'a> = Box<dyn FnMut(ProgressState) + 'a>;

pub struct FrameDriver<'a> {
    duration: f64,
    checkpoints: Checkpoints<'a>,
    fired: Vec<bool>,
    on_update: Option<StateFn<'a>>,
    on_complete: Option<StateFn<'a>>,
    reporter: Reporter,
    handle: RunHandle,
    finished: bool,
}

impl<'a> FrameDriver<'a> {
    /// `duration` in seconds; zero, negative or NaN completes on the first frame.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            checkpoints: Checkpoints::new(),
            fired: Vec::new(),
            on_update: None,
            on_complete: None,
            reporter: Reporter::silent(),
            handle: RunHandle::new(),
            finished: false,
        }
    }

    pub fn checkpoints(mut self, checkpoints: Checkpoints<'a>) -> Self {
        self.fired = vec![false; checkpoints.len()];
        self.checkpoints = checkpoints;
        self
    }

    pub fn checkpoint(mut self, threshold: f64, f: impl FnMut() + 'a) -> Self {
        self.checkpoints.insert(threshold, f);
        self.fired = vec![false; self.checkpoints.len()];
        self
    }

    pub fn on_update(mut self, f: impl FnMut(ProgressState) + 'a) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut(ProgressState) + 'a) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Where contained callback failures go. Defaults to dropping them.
    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn handle(&self) -> RunHandle {
        self.handle.clone()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Progress after `elapsed` seconds. Linear, no easing.
    pub fn progress_at(&self, elapsed: f64) -> ProgressState {
        let progress = if self.duration > 0.0 {
            factor_in(elapsed, 0.0, self.duration)
        } else {
            1.0
        };
        ProgressState {
            progress,
            time: elapsed,
        }
    }

    /// Advance to `elapsed` since the run started.
    pub fn tick(&mut self, elapsed: Duration) -> FrameStatus {
        if self.finished {
            return FrameStatus::Completed;
        }
        if !self.handle.is_running() {
            return FrameStatus::Stopped;
        }

        let state = self.progress_at(elapsed.as_secs_f64());
        log::trace!("frame t={:.4}s progress={:.4}", state.time, state.progress);

        if let Some(cb) = self.on_update.as_mut() {
            self.reporter.call(Hook::OnUpdate, || cb(state));
        }

        for (i, (threshold, cb)) in self.checkpoints.entries_mut().iter_mut().enumerate() {
            let due = *threshold <= state.progress;
            if self.fired[i] || !due {
                continue;
            }
            self.fired[i] = true;
            let hook = Hook::Checkpoint {
                threshold: *threshold,
            };
            self.reporter.call(hook, || cb());
        }

        if state.progress < 1.0 {
            return FrameStatus::Running;
        }

        self.finished = true;
        self.handle.stop();
        if let Some(cb) = self.on_complete.as_mut() {
            let done = ProgressState {
                progress: 1.0,
                time: state.time,
            };
            self.reporter.call(Hook::OnComplete, || cb(done));
        }
        FrameStatus::Completed
    }
}

impl fmt::Debug for FrameDriver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDriver")
            .field("duration", &self.duration)
            .field("checkpoints", &self.checkpoints)
            .field("fired", &self.fired)
            .field("finished", &self.finished)
            .field("running", &self.handle.is_running())
            .finish_non_exhaustive()
    }
}

/// A running frame driver. Resolves when the ramp completes or is stopped;
/// dropping it stops the run.
#[must_use = "a playback does nothing unless awaited"]
pub struct Playback<'a> {
    handle: RunHandle,
    fut: LocalBoxFuture<'a, DriverOutcome>,
}

impl Playback<'_> {
    pub fn handle(&self) -> RunHandle {
        self.handle.clone()
    }

    pub fn stop(&self) {
        self.handle.stop();
    }
}

impl Future for Playback<'_> {
    type Output = DriverOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().fut.poll_unpin(cx)
    }
}

impl Drop for Playback<'_> {
    fn drop(&mut self) {
        self.handle.stop();
    }
}

impl fmt::Debug for Playback<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playback")
            .field("running", &self.handle.is_running())
            .finish_non_exhaustive()
    }
}

/// Start `driver` against `clock`. The start instant is taken now; the first
/// step runs on the next frame.
pub fn play_animation<'a, C>(mut driver: FrameDriver<'a>, clock: &'a C) -> Playback<'a>
where
    C: FrameClock + ?Sized,
{
    let handle = driver.handle();
    let start = clock.now();
    let fut = async move {
        loop {
            let now = clock.next_frame().await;
            match driver.tick(now.saturating_duration_since(start)) {
                FrameStatus::Running => continue,
                FrameStatus::Completed => return DriverOutcome::Completed,
                FrameStatus::Stopped => return DriverOutcome::Stopped,
            }
        }
    }
    .boxed_local();
    Playback { handle, fut }
}
