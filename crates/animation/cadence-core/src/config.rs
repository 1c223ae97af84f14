//! Engine configuration for cadence-core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Frame rate used when none is configured or the configured one is unusable.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Configuration for frame pacing and callback error reporting.
/// Keep this minimal; new fields must carry a serde default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display refresh rate the default clock paces frames at, in Hz.
    pub frame_rate: f64,

    /// Log contained callback failures at `warn` when no error handler is installed.
    pub report_callback_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            report_callback_errors: true,
        }
    }
}

impl Config {
    /// Parse a JSON document; missing fields fall back to their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(ConfigError::InvalidFrameRate(self.frame_rate));
        }
        Ok(())
    }

    /// Wall-clock time between two frames. An invalid `frame_rate` falls
    /// back to the default rate.
    pub fn frame_interval(&self) -> Duration {
        let interval = self
            .validate()
            .ok()
            .and_then(|()| Duration::try_from_secs_f64(1.0 / self.frame_rate).ok());
        match interval {
            Some(interval) => interval,
            None => {
                log::warn!(
                    "unusable frame_rate {}; pacing at {} Hz",
                    self.frame_rate,
                    DEFAULT_FRAME_RATE
                );
                Duration::from_secs_f64(1.0 / DEFAULT_FRAME_RATE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = Config::from_json_str(r#"{ "frame_rate": 120.0 }"#).expect("config");
        assert_eq!(cfg.frame_rate, 120.0);
        assert!(cfg.report_callback_errors);
    }

    #[test]
    fn rejects_non_positive_frame_rate() {
        let err = Config::from_json_str(r#"{ "frame_rate": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFrameRate(r) if r == 0.0));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Config::from_json_str("{ frame_rate").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn frame_interval_matches_rate() {
        let cfg = Config {
            frame_rate: 50.0,
            ..Config::default()
        };
        assert_eq!(cfg.frame_interval(), Duration::from_millis(20));
    }

    #[test]
    fn invalid_frame_rate_paces_at_default() {
        let fallback = Config::default().frame_interval();
        for rate in [0.0, -30.0, f64::NAN, f64::INFINITY, 1e-320] {
            let cfg = Config {
                frame_rate: rate,
                ..Config::default()
            };
            assert_eq!(cfg.frame_interval(), fallback, "frame_rate {rate}");
        }
    }
}
