//! # Terminal result of a poll.
//!
//! Exactly one [`Outcome`] is produced per successful call to
//! [`Poller::poll`](crate::Poller::poll). Timeout and interruption are outcomes,
//! not errors.

/// Terminal result of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The probe produced a value.
    Done(T),
    /// Every stage ran out without a value.
    TimeoutExpired,
    /// The interruption signal fired before a value or exhaustion.
    Interrupted,
}

/// Value-less classification of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// See [`Outcome::Done`].
    Done,
    /// See [`Outcome::TimeoutExpired`].
    TimeoutExpired,
    /// See [`Outcome::Interrupted`].
    Interrupted,
}

impl Status {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Status::Done => "done",
            Status::TimeoutExpired => "timeout_expired",
            Status::Interrupted => "interrupted",
        }
    }
}

impl<T> Outcome<T> {
    /// Returns the status tag.
    pub fn status(&self) -> Status {
        match self {
            Outcome::Done(_) => Status::Done,
            Outcome::TimeoutExpired => Status::TimeoutExpired,
            Outcome::Interrupted => Status::Interrupted,
        }
    }

    /// `true` for [`Outcome::Done`].
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    /// Returns the produced value, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Done(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the outcome and returns the produced value, if any.
    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Done(v) => Some(v),
            _ => None,
        }
    }

    /// Maps the produced value, keeping the status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(v) => Outcome::Done(f(v)),
            Outcome::TimeoutExpired => Outcome::TimeoutExpired,
            Outcome::Interrupted => Outcome::Interrupted,
        }
    }
}
