//! Engine: unit players and the sequence composer.
//!
//! Methods:
//! - play_item / play_promise / play_callback (leaf units)
//! - play_unit (dispatch), play_sequence (serial or parallel), run (fresh context)
//!
//! Every suspension point (delay, frame, promise, `Done`) also watches the
//! engine's cancellation token.

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{self, FutureExt, LocalBoxFuture};
use tokio_util::sync::CancellationToken;

use crate::clock::{FrameClock, IntervalClock};
use crate::config::Config;
use crate::context::AnimationContext;
use crate::driver::{play_animation, DriverOutcome, FrameDriver, Playback, ProgressState};
use crate::error::{CallbackError, Hook, SequenceError};
use crate::guard::{self, Reporter};
use crate::unit::{CallbackUnit, Done, PromiseUnit, Sequence, TimedUnit, Unit};

#[derive(Debug)]
pub struct Engine<C: FrameClock = IntervalClock> {
    cfg: Config,
    clock: C,
    reporter: Reporter,
    cancel: CancellationToken,
}

impl Engine<IntervalClock> {
    /// Engine on tokio timers, paced at `cfg.frame_rate`.
    pub fn new(cfg: Config) -> Self {
        let clock = IntervalClock::from_config(&cfg);
        Self::with_clock(cfg, clock)
    }
}

impl Default for Engine<IntervalClock> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<C: FrameClock> Engine<C> {
    pub fn with_clock(cfg: Config, clock: C) -> Self {
        let reporter = Reporter::new(None, cfg.report_callback_errors);
        Self {
            cfg,
            clock,
            reporter,
            cancel: CancellationToken::new(),
        }
    }

    /// Route contained callback failures to `handler` instead of the log.
    pub fn on_error(mut self, handler: impl Fn(&CallbackError) + 'static) -> Self {
        self.reporter = Reporter::new(Some(Rc::new(handler)), self.cfg.report_callback_errors);
        self
    }

    /// Share an existing token, e.g. a child of a host-wide shutdown token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort everything in flight on this engine. Irreversible.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Start a bare frame driver on this engine's clock and error routing.
    pub fn play_animation<'a>(&'a self, driver: FrameDriver<'a>) -> Playback<'a> {
        play_animation(driver.reporter(self.reporter.clone()), &self.clock)
    }

    pub(crate) fn ensure_live(&self) -> Result<(), SequenceError> {
        if self.cancel.is_cancelled() {
            Err(SequenceError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Await `fut` unless the engine is cancelled first.
    pub(crate) async fn guarded<F: Future>(&self, fut: F) -> Result<F::Output, SequenceError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SequenceError::Cancelled),
            out = fut => Ok(out),
        }
    }

    async fn pre_delay(&self, seconds: f64) -> Result<(), SequenceError> {
        if seconds.is_nan() || seconds <= 0.0 {
            return Ok(());
        }
        match Duration::try_from_secs_f64(seconds) {
            Ok(wait) => self.guarded(self.clock.sleep(wait)).await,
            Err(_) => {
                log::warn!("ignoring unrepresentable delay of {seconds}s");
                Ok(())
            }
        }
    }

    /// Timed unit: delay, `on_start`, then a frame driver for `duration`.
    /// Resolves once `on_complete` has fired.
    pub async fn play_item(
        &self,
        item: &mut TimedUnit,
        ctx: &AnimationContext,
    ) -> Result<(), SequenceError> {
        self.ensure_live()?;
        self.pre_delay(item.delay).await?;

        let TimedUnit {
            duration,
            checkpoints,
            on_start,
            on_update,
            on_complete,
            ..
        } = item;
        log::debug!("timed unit start: {duration}s, {} checkpoint(s)", checkpoints.len());

        if let Some(cb) = on_start.as_mut() {
            let start = ProgressState::default();
            self.reporter.call(Hook::OnStart, || cb(start, ctx));
        }

        let mut driver = FrameDriver::new(*duration)
            .checkpoints(checkpoints.reborrow())
            .reporter(self.reporter.clone());
        if let Some(cb) = on_update.as_mut() {
            driver = driver.on_update(move |state| cb(state, ctx));
        }
        if let Some(cb) = on_complete.as_mut() {
            driver = driver.on_complete(move |state| cb(state, ctx));
        }

        match self.guarded(play_animation(driver, &self.clock)).await? {
            DriverOutcome::Completed => Ok(()),
            DriverOutcome::Stopped => Err(SequenceError::Cancelled),
        }
    }

    /// Deferred promise: delay, then await the factory's future. Its error
    /// is returned unchanged.
    pub async fn play_promise(
        &self,
        item: &mut PromiseUnit,
        ctx: &AnimationContext,
    ) -> Result<(), SequenceError> {
        self.ensure_live()?;
        self.pre_delay(item.delay).await?;
        log::debug!("promise unit start");
        let fut = (item.factory)(ctx.clone());
        self.guarded(fut).await?.map_err(SequenceError::Rejected)
    }

    /// Deferred callback: delay, then hand out a [`Done`] and wait for it.
    /// A panic inside the callback rejects the unit unless `done()` was
    /// already called; then it is reported and the unit resolves.
    pub async fn play_callback(
        &self,
        item: &mut CallbackUnit,
        ctx: &AnimationContext,
    ) -> Result<(), SequenceError> {
        self.ensure_live()?;
        self.pre_delay(item.delay).await?;
        log::debug!("callback unit start");

        let (done, mut rx) = Done::pair();
        let callback = &mut item.callback;
        let ctx = ctx.clone();
        if let Err(message) = guard::catch(move || callback(done, ctx)) {
            // A failure after `done()` does not undo the completion.
            if !matches!(rx.try_recv(), Ok(Some(()))) {
                return Err(SequenceError::Rejected(anyhow::anyhow!(
                    "deferred callback panicked: {message}"
                )));
            }
            self.reporter.report(CallbackError {
                hook: Hook::Callback,
                message,
            });
            return Ok(());
        }

        if self.guarded(rx).await?.is_err() {
            // Done was dropped uncalled: nothing can complete this unit now.
            self.guarded(future::pending::<()>()).await?;
        }
        Ok(())
    }

    /// Dispatch on the unit's variant. Boxed so sequences can nest.
    pub fn play_unit<'a>(
        &'a self,
        unit: &'a mut Unit,
        ctx: &'a AnimationContext,
    ) -> LocalBoxFuture<'a, Result<(), SequenceError>> {
        async move {
            match unit {
                Unit::Timed(item) => self.play_item(item, ctx).await,
                Unit::Promise(item) => self.play_promise(item, ctx).await,
                Unit::Callback(item) => self.play_callback(item, ctx).await,
                Unit::Sequence(seq) => self.play_sequence(seq, ctx).await,
            }
        }
        .boxed_local()
    }

    /// `on_start`, the items (serially, or all at once when `parallel`), then
    /// `on_complete`. The first failing item fails the sequence and skips
    /// `on_complete`; in parallel mode its unfinished siblings are dropped.
    pub async fn play_sequence(
        &self,
        seq: &mut Sequence,
        ctx: &AnimationContext,
    ) -> Result<(), SequenceError> {
        self.ensure_live()?;
        let Sequence {
            parallel,
            items,
            on_start,
            on_complete,
        } = seq;
        log::debug!(
            "sequence start: {} item(s), {}",
            items.len(),
            if *parallel { "parallel" } else { "serial" }
        );

        if let Some(cb) = on_start.as_mut() {
            self.reporter.call(Hook::SequenceStart, || cb(ctx));
        }

        if *parallel {
            future::try_join_all(items.iter_mut().map(|item| self.play_unit(item, ctx))).await?;
        } else {
            for item in items.iter_mut() {
                self.play_unit(item, ctx).await?;
            }
        }

        if let Some(cb) = on_complete.as_mut() {
            self.reporter.call(Hook::SequenceComplete, || cb(ctx));
        }
        log::debug!("sequence complete");
        Ok(())
    }

    /// Top-level entry: play `seq` against a fresh context and hand it back.
    pub async fn run(&self, seq: &mut Sequence) -> Result<AnimationContext, SequenceError> {
        let ctx = AnimationContext::new();
        self.play_sequence(seq, &ctx).await?;
        Ok(ctx)
    }
}
