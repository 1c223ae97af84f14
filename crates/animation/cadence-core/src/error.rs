//! Error types for cadence-core.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies which user callback failed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Hook {
    OnStart,
    OnUpdate,
    OnComplete,
    Checkpoint { threshold: f64 },
    SequenceStart,
    SequenceComplete,
    /// Deferred callback that failed after signalling `Done`.
    Callback,
    /// Continuation passed to `wait_for` / `wait_for_ms`.
    Wait,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::OnStart => f.write_str("on_start"),
            Hook::OnUpdate => f.write_str("on_update"),
            Hook::OnComplete => f.write_str("on_complete"),
            Hook::Checkpoint { threshold } => write!(f, "checkpoint@{threshold}"),
            Hook::SequenceStart => f.write_str("sequence.on_start"),
            Hook::SequenceComplete => f.write_str("sequence.on_complete"),
            Hook::Callback => f.write_str("callback"),
            Hook::Wait => f.write_str("wait"),
        }
    }
}

/// A user callback failed. Contained at the call site; never aborts playback.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("{hook} callback failed: {message}")]
pub struct CallbackError {
    pub hook: Hook,
    pub message: String,
}

/// Failure of a play call.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SequenceError {
    /// A deferred-promise unit resolved with an error; carried through unchanged.
    #[error(transparent)]
    Rejected(#[from] anyhow::Error),

    /// The engine's cancellation token fired while the unit was in flight.
    #[error("playback cancelled")]
    Cancelled,
}

impl SequenceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SequenceError::Cancelled)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("frame_rate must be a positive finite number, got {0}")]
    InvalidFrameRate(f64),

    #[error("config json parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
