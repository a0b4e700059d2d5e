//! # Poll lifecycle events.
//!
//! The [`EventKind`] enum classifies what happened during a poll:
//! - **Plan events**: the poll started, or its stage plan was rejected
//! - **Stage events**: a stage started or ran out of time
//! - **Probe events**: a probe call came back empty or failed
//! - **Terminal events**: the poll finished as done, timed out or interrupted
//! - **Delivery reports**: a subscriber lost an event or panicked while handling one
//!
//! The [`Event`] struct carries metadata such as the probe name, stage index,
//! attempt number and stage timings. Delivery reports copy the probe, stage and
//! attempt of the event they are about.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use stagepoll::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StageStarted)
//!     .with_probe("row-count")
//!     .with_stage(1)
//!     .with_duration(Duration::from_secs(300))
//!     .with_interval(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::StageStarted);
//! assert_eq!(ev.probe.as_deref(), Some("row-count"));
//! assert_eq!(ev.interval_ms, Some(5_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of poll events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Plan events ===
    /// A poll passed validation and is about to run its first stage.
    ///
    /// Sets:
    /// - `probe`: probe name
    /// - `stages`: number of stages in the plan
    /// - `duration_ms`: summed duration of all stages
    PollStarted,

    /// The stage plan failed validation; nothing was probed.
    ///
    /// Sets:
    /// - `probe`: probe name
    /// - `stage`: index of the first invalid stage
    /// - `reason`: violated rule
    StageRejected,

    // === Stage events ===
    /// A stage is starting; its deadline timer has been armed.
    ///
    /// Sets:
    /// - `probe`: probe name
    /// - `stage`: stage index (0-based)
    /// - `duration_ms`, `interval_ms`: stage timings
    StageStarted,

    /// A stage ended by its deadline without a value and without interruption.
    ///
    /// Sets:
    /// - `probe`: probe name
    /// - `stage`: stage index
    /// - `attempt`: attempts made so far in this poll
    StageExpired,

    // === Probe events ===
    /// The probe answered "not yet".
    ///
    /// Sets:
    /// - `probe`: probe name
    /// - `stage`: stage index
    /// - `attempt`: attempt number (1-based, per poll)
    ProbeEmpty,

    /// The probe failed; the poll is aborted.
    ///
    /// Sets:
    /// - `probe`: probe name
    /// - `stage`: stage index
    /// - `attempt`: attempt number
    /// - `reason`: failure message
    ProbeFailed,

    // === Terminal events ===
    /// The probe produced a value.
    ///
    /// Sets:
    /// - `probe`, `stage`, `attempt`
    PollDone,

    /// All stages ran out.
    ///
    /// Sets:
    /// - `probe`, `attempt`
    PollTimedOut,

    /// The interruption signal ended the poll.
    ///
    /// Sets:
    /// - `probe`, `stage`, `attempt`
    PollInterrupted,

    // === Delivery reports ===
    /// An event was dropped for one subscriber (queue full or worker gone).
    ///
    /// Sets:
    /// - `subscriber`: name of the subscriber that lost the event
    /// - `probe`, `stage`, `attempt`: copied from the dropped event
    /// - `reason`: why it was dropped, with the dropped `seq`
    SubscriberOverflow,

    /// A subscriber panicked inside `on_event`.
    ///
    /// Sets:
    /// - `subscriber`: name of the subscriber that panicked
    /// - `probe`, `stage`, `attempt`: copied from the event being handled
    /// - `reason`: panic message
    SubscriberPanicked,
}

impl EventKind {
    /// Returns `true` for reports about event delivery itself.
    ///
    /// Failing to deliver one of these never produces another report.
    #[inline]
    pub fn is_delivery_report(&self) -> bool {
        matches!(
            self,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

/// Poll event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the probe being polled.
    pub probe: Option<Arc<str>>,
    /// Stage index (0-based).
    pub stage: Option<usize>,
    /// Number of stages in the plan.
    pub stages: Option<usize>,
    /// Attempt count (starting from 1, per poll).
    pub attempt: Option<u64>,
    /// Stage duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Stage interval in milliseconds.
    pub interval_ms: Option<u64>,
    /// Human-readable reason (errors, rejected rules, delivery failures).
    pub reason: Option<Arc<str>>,
    /// Subscriber a delivery report is about.
    pub subscriber: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            probe: None,
            stage: None,
            stages: None,
            attempt: None,
            duration_ms: None,
            interval_ms: None,
            reason: None,
            subscriber: None,
        }
    }

    /// Attaches a probe name.
    #[inline]
    pub fn with_probe(mut self, probe: impl Into<Arc<str>>) -> Self {
        self.probe = Some(probe.into());
        self
    }

    /// Attaches a stage index.
    #[inline]
    pub fn with_stage(mut self, index: usize) -> Self {
        self.stage = Some(index);
        self
    }

    /// Attaches the plan length.
    #[inline]
    pub fn with_stages(mut self, count: usize) -> Self {
        self.stages = Some(count);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a stage duration (stored as milliseconds).
    #[inline]
    pub fn with_duration(mut self, d: Duration) -> Self {
        self.duration_ms = Some(as_ms(d));
        self
    }

    /// Attaches a stage interval (stored as milliseconds).
    #[inline]
    pub fn with_interval(mut self, d: Duration) -> Self {
        self.interval_ms = Some(as_ms(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the subscriber a delivery report is about.
    #[inline]
    pub fn with_subscriber(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(name.into());
        self
    }
}

fn as_ms(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}
