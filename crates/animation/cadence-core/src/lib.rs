//! Cadence Core (engine-agnostic animation sequencing)
//!
//! Composes timed ramps, deferred futures and deferred callbacks into serial
//! or parallel sequences, nested to any depth. Timed units are driven once
//! per display frame by a [`FrameDriver`]; the host supplies frames and timers
//! through a [`FrameClock`].
//!
//! Everything runs on one thread: engine futures are `!Send` and expect a
//! current-thread tokio runtime or a `LocalSet`.

pub mod checkpoints;
pub mod clock;
pub mod config;
pub mod context;
pub mod driver;
pub mod engine;
pub mod error;
pub mod guard;
pub mod math;
pub mod unit;
pub mod wait;

// Re-exports for consumers (hosts)
pub use checkpoints::Checkpoints;
pub use clock::{FrameClock, IntervalClock};
pub use config::Config;
pub use context::{AnimationContext, AnimationElement};
pub use driver::{
    play_animation, DriverOutcome, FrameDriver, FrameStatus, Playback, ProgressState, RunHandle,
};
pub use engine::Engine;
pub use error::{CallbackError, ConfigError, Hook, SequenceError};
pub use guard::{ErrorHandler, Reporter};
pub use tokio_util::sync::CancellationToken;
pub use unit::{CallbackUnit, Done, PromiseUnit, Sequence, TimedUnit, Unit, UnitKind};
