//! Error types used by the poller and by probes.
//!
//! This module defines three error types:
//!
//! - [`RangeViolation`]: the rule a single [`Stage`] breaks.
//! - [`PollError`]: errors that end a poll without an [`Outcome`](crate::Outcome).
//! - [`ProbeError`]: errors raised by a probe while querying.
//!
//! Timeout and interruption are **not** errors; they are ordinary outcomes.
//! `PollError` and `ProbeError` provide helper methods (`as_label`, `as_message`)
//! for logging/metrics.

use thiserror::Error;

use crate::stages::Stage;

/// # Rule violated by an invalid stage.
///
/// Checked in declaration order; the first matching rule is reported.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    /// `duration_ms` or `interval_ms` is negative.
    #[error("timeout values must be positive")]
    Negative,

    /// `interval_ms` is [`Stage::UNBOUNDED`].
    #[error("interval can't be infinite")]
    InfiniteInterval,

    /// `duration_ms` is above [`MAX_TIMEOUT_MS`](crate::config::MAX_TIMEOUT_MS).
    #[error("duration exceeds max timeout")]
    ExceedsMaxTimeout,
}

impl RangeViolation {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RangeViolation::Negative => "negative_value",
            RangeViolation::InfiniteInterval => "infinite_interval",
            RangeViolation::ExceedsMaxTimeout => "exceeds_max_timeout",
        }
    }
}

/// # Errors that abort a poll.
///
/// Two categories:
/// - **configuration** ([`PollError::InvalidStage`]): reported before any timer starts
///   or any probe runs; not retryable until the caller fixes the input;
/// - **probe failure** ([`PollError::Probe`]): the probe itself is broken; the poll stops
///   immediately and no outcome is produced.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PollError {
    /// A stage definition failed validation.
    #[error("stage #{index} is invalid: {violation}")]
    InvalidStage {
        /// Position of the first invalid stage in the sequence.
        index: usize,
        /// The offending stage as supplied.
        stage: Stage,
        /// Which rule it broke.
        violation: RangeViolation,
    },

    /// The probe failed; propagated unchanged.
    #[error(transparent)]
    Probe(#[from] ProbeError),
}

impl PollError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stagepoll::{PollError, ProbeError};
    ///
    /// let err = PollError::from(ProbeError::fail("connection reset"));
    /// assert_eq!(err.as_label(), "probe_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PollError::InvalidStage { .. } => "invalid_stage",
            PollError::Probe(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PollError::InvalidStage {
                index,
                stage,
                violation,
            } => format!(
                "invalid stage #{index} (duration_ms={}, interval_ms={}): {violation}",
                stage.duration_ms, stage.interval_ms
            ),
            PollError::Probe(e) => e.as_message(),
        }
    }

    /// Indicates whether the error comes from the stage configuration
    /// rather than from the probe.
    pub fn is_config(&self) -> bool {
        matches!(self, PollError::InvalidStage { .. })
    }
}

/// # Errors produced by a probe.
///
/// A probe reports "not yet" with `Ok(None)`; an error means the probe is broken
/// and is never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The probe's query failed.
    #[error("probe failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl ProbeError {
    /// Builds a [`ProbeError::Failed`] from anything printable.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ProbeError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeError::Failed { .. } => "probe_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ProbeError::Failed { error } => format!("error: {error}"),
        }
    }
}
