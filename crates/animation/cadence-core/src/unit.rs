//! Schedulable units of an animation sequence.
//!
//! [`Unit`] is a closed sum type; the engine dispatches on the variant.
//! Units are played through `&mut`, so the same tree can be replayed.

use std::fmt;
use std::future::Future;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};

use crate::checkpoints::Checkpoints;
use crate::context::AnimationContext;
use crate::driver::ProgressState;

pub type StateCallback = Box<dyn FnMut(ProgressState, &AnimationContext)>;
pub type ContextCallback = Box<dyn FnMut(&AnimationContext)>;
pub type PromiseFactory =
    Box<dyn FnMut(AnimationContext) -> LocalBoxFuture<'static, anyhow::Result<()>>>;
pub type DeferredFn = Box<dyn FnMut(Done, AnimationContext)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Timed,
    Promise,
    Callback,
    Sequence,
}

pub enum Unit {
    Timed(TimedUnit),
    Promise(PromiseUnit),
    Callback(CallbackUnit),
    Sequence(Sequence),
}

impl Unit {
    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Timed(_) => UnitKind::Timed,
            Unit::Promise(_) => UnitKind::Promise,
            Unit::Callback(_) => UnitKind::Callback,
            Unit::Sequence(_) => UnitKind::Sequence,
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Timed(u) => fmt::Debug::fmt(u, f),
            Unit::Promise(u) => fmt::Debug::fmt(u, f),
            Unit::Callback(u) => fmt::Debug::fmt(u, f),
            Unit::Sequence(u) => fmt::Debug::fmt(u, f),
        }
    }
}

impl From<TimedUnit> for Unit {
    fn from(u: TimedUnit) -> Self {
        Unit::Timed(u)
    }
}

impl From<PromiseUnit> for Unit {
    fn from(u: PromiseUnit) -> Self {
        Unit::Promise(u)
    }
}

impl From<CallbackUnit> for Unit {
    fn from(u: CallbackUnit) -> Self {
        Unit::Callback(u)
    }
}

impl From<Sequence> for Unit {
    fn from(u: Sequence) -> Self {
        Unit::Sequence(u)
    }
}

/// A frame-driven ramp of `duration` seconds.
pub struct TimedUnit {
    /// Seconds to wait before starting. Non-positive means none.
    pub delay: f64,
    pub duration: f64,
    pub checkpoints: Checkpoints<'static>,
    pub on_start: Option<StateCallback>,
    pub on_update: Option<StateCallback>,
    pub on_complete: Option<StateCallback>,
}

impl TimedUnit {
    pub fn new(duration: f64) -> Self {
        Self {
            delay: 0.0,
            duration,
            checkpoints: Checkpoints::new(),
            on_start: None,
            on_update: None,
            on_complete: None,
        }
    }

    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    pub fn checkpoint(mut self, threshold: f64, f: impl FnMut() + 'static) -> Self {
        self.checkpoints.insert(threshold, f);
        self
    }

    pub fn on_start(mut self, f: impl FnMut(ProgressState, &AnimationContext) + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl FnMut(ProgressState, &AnimationContext) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete(
        mut self,
        f: impl FnMut(ProgressState, &AnimationContext) + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for TimedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedUnit")
            .field("delay", &self.delay)
            .field("duration", &self.duration)
            .field("checkpoints", &self.checkpoints)
            .finish_non_exhaustive()
    }
}

/// Awaits a future built from the context. An `Err` fails the enclosing sequence.
pub struct PromiseUnit {
    pub delay: f64,
    pub(crate) factory: PromiseFactory,
}

impl PromiseUnit {
    pub fn new<F, Fut>(mut factory: F) -> Self
    where
        F: FnMut(AnimationContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        Self {
            delay: 0.0,
            factory: Box::new(move |ctx| factory(ctx).boxed_local()),
        }
    }

    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }
}

impl fmt::Debug for PromiseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseUnit")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Hands the callee a [`Done`]; completes when it is called. There is no
/// timeout.
pub struct CallbackUnit {
    pub delay: f64,
    pub(crate) callback: DeferredFn,
}

impl CallbackUnit {
    pub fn new(f: impl FnMut(Done, AnimationContext) + 'static) -> Self {
        Self {
            delay: 0.0,
            callback: Box::new(f),
        }
    }

    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }
}

impl fmt::Debug for CallbackUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackUnit")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Completion signal for a [`CallbackUnit`].
///
/// Dropping it without calling [`Done::done`] leaves the unit pending.
pub struct Done {
    tx: Option<oneshot::Sender<()>>,
}

impl Done {
    pub(crate) fn pair() -> (Done, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Done { tx: Some(tx) }, rx)
    }

    pub fn done(mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for Done {
    fn drop(&mut self) {
        if self.tx.is_some() && !std::thread::panicking() {
            log::warn!("deferred callback dropped its Done handle; the unit will stay pending");
        }
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("pending", &self.tx.is_some())
            .finish()
    }
}

/// Ordered list of units run serially (default) or in parallel.
pub struct Sequence {
    pub parallel: bool,
    pub items: Vec<Unit>,
    pub on_start: Option<ContextCallback>,
    pub on_complete: Option<ContextCallback>,
}

impl Sequence {
    pub fn serial(items: impl IntoIterator<Item = Unit>) -> Self {
        Self {
            parallel: false,
            items: items.into_iter().collect(),
            on_start: None,
            on_complete: None,
        }
    }

    pub fn parallel(items: impl IntoIterator<Item = Unit>) -> Self {
        Self {
            parallel: true,
            ..Self::serial(items)
        }
    }

    pub fn push(&mut self, unit: impl Into<Unit>) {
        self.items.push(unit.into());
    }

    pub fn then(mut self, unit: impl Into<Unit>) -> Self {
        self.push(unit);
        self
    }

    pub fn on_start(mut self, f: impl FnMut(&AnimationContext) + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut(&AnimationContext) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::serial(Vec::new())
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("parallel", &self.parallel)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}
