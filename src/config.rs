//! # Poller configuration.
//!
//! Provides [`Config`], the default stage plan used by [`Poller`](crate::Poller),
//! plus the time-unit constants that stage definitions are expressed in.
//!
//! Config is used in two ways:
//! 1. **Poller creation**: `Poller::builder(config)`
//! 2. **Defaults**: `Config::default()` polls once per second for up to 24 hours
//!
//! ## Ceiling
//! No stage may run longer than [`MAX_TIMEOUT_MS`]; [`validate_stages`](crate::validate_stages)
//! rejects anything above it.

use crate::stages::Stage;

/// One second, in milliseconds.
pub const SECOND_MS: i64 = 1_000;
/// One minute, in milliseconds.
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
/// One hour, in milliseconds.
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Maximum duration of a single stage (24 hours).
pub const MAX_TIMEOUT_MS: i64 = 24 * HOUR_MS;

/// Interval of the default stage.
pub const DEFAULT_INTERVAL_MS: i64 = SECOND_MS;

/// Configuration for a [`Poller`](crate::Poller).
///
/// ## Field semantics
/// - `stages`: ordered escalation plan; an empty list is legal and yields
///   [`Outcome::TimeoutExpired`](crate::Outcome::TimeoutExpired) without probing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Stages processed strictly in order.
    pub stages: Vec<Stage>,
}

impl Config {
    /// Creates a configuration with the given stage plan.
    pub fn with_stages(stages: impl Into<Vec<Stage>>) -> Self {
        Self {
            stages: stages.into(),
        }
    }

    /// Total time budget of all stages, ignoring invalid (negative) entries.
    #[inline]
    pub fn total_budget_ms(&self) -> i64 {
        self.stages
            .iter()
            .map(|s| s.duration_ms.max(0))
            .fold(0i64, i64::saturating_add)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - one stage `{ duration = MAX_TIMEOUT_MS, interval = DEFAULT_INTERVAL_MS }`
    fn default() -> Self {
        Self {
            stages: vec![Stage::default()],
        }
    }
}
