//! # LogWriter: `tracing` event renderer
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Install any `tracing` subscriber (e.g. `tracing-subscriber`) to see the output.
//!
//! ## Example output
//! ```text
//! INFO  poll started probe="row-count" stages=2 budget_ms=310000
//! DEBUG stage started probe="row-count" stage=0 duration_ms=10000 interval_ms=250
//! TRACE probe empty probe="row-count" stage=0 attempt=1
//! DEBUG stage expired probe="row-count" stage=0 attempt=40
//! INFO  poll done probe="row-count" stage=1 attempt=43
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, trace, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let probe = e.probe.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::PollStarted => {
                info!(probe, stages = e.stages, budget_ms = e.duration_ms, "poll started");
            }
            EventKind::StageRejected => {
                error!(probe, stage = e.stage, reason = e.reason.as_deref(), "stage rejected");
            }
            EventKind::StageStarted => {
                debug!(
                    probe,
                    stage = e.stage,
                    duration_ms = e.duration_ms,
                    interval_ms = e.interval_ms,
                    "stage started"
                );
            }
            EventKind::StageExpired => {
                debug!(probe, stage = e.stage, attempt = e.attempt, "stage expired");
            }
            EventKind::ProbeEmpty => {
                trace!(probe, stage = e.stage, attempt = e.attempt, "probe empty");
            }
            EventKind::ProbeFailed => {
                warn!(
                    probe,
                    stage = e.stage,
                    attempt = e.attempt,
                    reason = e.reason.as_deref(),
                    "probe failed"
                );
            }
            EventKind::PollDone => {
                info!(probe, stage = e.stage, attempt = e.attempt, "poll done");
            }
            EventKind::PollTimedOut => {
                info!(probe, attempt = e.attempt, "poll timed out");
            }
            EventKind::PollInterrupted => {
                info!(probe, stage = e.stage, attempt = e.attempt, "poll interrupted");
            }
            EventKind::SubscriberOverflow => {
                warn!(
                    probe,
                    subscriber = e.subscriber.as_deref(),
                    stage = e.stage,
                    reason = e.reason.as_deref(),
                    "subscriber lost an event"
                );
            }
            EventKind::SubscriberPanicked => {
                error!(
                    probe,
                    subscriber = e.subscriber.as_deref(),
                    stage = e.stage,
                    reason = e.reason.as_deref(),
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
