//! # Single-stage probe/wait cycle.
//!
//! [`resolve_cycle`] runs one stage: probe, and if there is no value yet, ask the
//! [`Continuation`] whether to go again.
//!
//! ```text
//! loop {
//!   ├─► query()  ── Err(e)     ─► return Err(e)      (never retried)
//!   │            ── Some(v)    ─► return Some(v)     (continuation not consulted)
//!   │            ── None
//!   └─► proceed() ── true      ─► continue
//!                 ── false     ─► return None
//! }
//! ```
//!
//! ## Rules
//! - The probe runs **at least once**.
//! - At most one probe call is in flight; the next starts only after `proceed()`.
//! - Iteration count is unbounded; termination belongs to the continuation.
//!
//! [`StageGate`] is the continuation used by the poller: it races the external
//! interruption, the stage deadline and a fresh interval timer.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::delay::{Delay, wait_delay};
use crate::error::ProbeError;

/// Decides whether a stage should probe again.
#[async_trait]
pub trait Continuation: Send {
    /// Waits until the next attempt is due (`true`) or the stage is over (`false`).
    async fn proceed(&mut self) -> bool;
}

/// Runs `query` until it yields a value or `gate` says stop.
pub async fn resolve_cycle<T, Q, Fut, C>(
    mut query: Q,
    gate: &mut C,
) -> Result<Option<T>, ProbeError>
where
    Q: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ProbeError>>,
    C: Continuation + ?Sized,
{
    loop {
        if let Some(value) = query().await? {
            return Ok(Some(value));
        }
        if !gate.proceed().await {
            return Ok(None);
        }
    }
}

/// Continuation for one stage of a poll.
///
/// Tie order is fixed: interruption, then the stage deadline, then the interval.
/// A stop therefore never loses to a pending "go again".
pub struct StageGate<'a> {
    interval: Duration,
    deadline: &'a mut Delay,
    interrupt: &'a CancellationToken,
}

impl<'a> StageGate<'a> {
    /// Creates a gate with a fresh interval timer per decision.
    pub fn new(
        interval: Duration,
        deadline: &'a mut Delay,
        interrupt: &'a CancellationToken,
    ) -> Self {
        Self {
            interval,
            deadline,
            interrupt,
        }
    }
}

#[async_trait]
impl Continuation for StageGate<'_> {
    async fn proceed(&mut self) -> bool {
        tokio::select! {
            biased;
            _ = self.interrupt.cancelled() => false,
            _ = &mut *self.deadline => false,
            _ = wait_delay(self.interval) => true,
        }
    }
}
