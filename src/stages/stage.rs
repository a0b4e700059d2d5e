//! # One polling window.
//!
//! [`Stage`] is an immutable `{ duration_ms, interval_ms }` pair:
//! - `duration_ms` the maximum time the stage may run;
//! - `interval_ms` the delay between two probe attempts inside the stage.
//!
//! Values are kept as signed milliseconds so that configuration coming from
//! outside (files, flags, other services) can be represented as-is and rejected
//! by [`validate_stages`] instead of being silently clamped.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use stagepoll::{RangeViolation, Stage};
//!
//! let fast = Stage::new(10_000, 250);
//! assert_eq!(fast.check(), Ok(()));
//! assert_eq!(fast.interval(), Duration::from_millis(250));
//!
//! let broken = Stage::new(1_000, Stage::UNBOUNDED);
//! assert_eq!(broken.check(), Err(RangeViolation::InfiniteInterval));
//! ```

use std::time::Duration;

use tracing::error;

use crate::config::{DEFAULT_INTERVAL_MS, MAX_TIMEOUT_MS};
use crate::error::{PollError, RangeViolation};

/// A single polling window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stage {
    /// Maximum time this stage may run, in milliseconds.
    pub duration_ms: i64,
    /// Delay between successive probe attempts, in milliseconds.
    pub interval_ms: i64,
}

impl Default for Stage {
    /// Returns `{ duration = MAX_TIMEOUT_MS, interval = DEFAULT_INTERVAL_MS }`.
    fn default() -> Self {
        Self {
            duration_ms: MAX_TIMEOUT_MS,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl Stage {
    /// Marker for an unbounded ("infinite") value. Never valid as an interval.
    pub const UNBOUNDED: i64 = i64::MAX;

    /// Creates a stage from raw millisecond values. Nothing is checked here.
    pub const fn new(duration_ms: i64, interval_ms: i64) -> Self {
        Self {
            duration_ms,
            interval_ms,
        }
    }

    /// Creates a stage from [`Duration`]s.
    ///
    /// Values that do not fit in `i64` milliseconds (e.g. `Duration::MAX`)
    /// saturate to [`Stage::UNBOUNDED`].
    pub fn from_durations(duration: Duration, interval: Duration) -> Self {
        Self::new(saturating_ms(duration), saturating_ms(interval))
    }

    /// Checks this stage against the range rules, in order:
    /// 1. both values non-negative;
    /// 2. interval not unbounded;
    /// 3. duration not above [`MAX_TIMEOUT_MS`].
    pub fn check(&self) -> Result<(), RangeViolation> {
        if self.duration_ms < 0 || self.interval_ms < 0 {
            return Err(RangeViolation::Negative);
        }
        if self.interval_ms == Self::UNBOUNDED {
            return Err(RangeViolation::InfiniteInterval);
        }
        if self.duration_ms > MAX_TIMEOUT_MS {
            return Err(RangeViolation::ExceedsMaxTimeout);
        }
        Ok(())
    }

    /// Stage duration as a [`Duration`]; negative values read as zero.
    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms.max(0) as u64)
    }

    /// Stage interval as a [`Duration`]; negative values read as zero.
    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(0) as u64)
    }
}

/// Validates a stage plan and returns the first violation, if any.
///
/// Pure and synchronous: runs before any timer starts and before the probe
/// is ever invoked. An empty plan is valid.
pub fn validate_stages(stages: &[Stage]) -> Result<(), PollError> {
    for (index, stage) in stages.iter().enumerate() {
        if let Err(violation) = stage.check() {
            error!(
                index,
                duration_ms = stage.duration_ms,
                interval_ms = stage.interval_ms,
                reason = violation.as_label(),
                "rejecting stage plan: {violation}"
            );
            return Err(PollError::InvalidStage {
                index,
                stage: *stage,
                violation,
            });
        }
    }
    Ok(())
}

fn saturating_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(Stage::UNBOUNDED)
}
