//! # Poller: walks a stage plan until a probe yields a value.
//!
//! The [`Poller`] owns a validated-on-use stage plan, an optional external
//! interruption token and a [`SubscriberSet`] for lifecycle events.
//!
//! ## Flow
//! ```text
//! poll(probe)
//!   ├─► validate_stages(plan) ── Err ─► StageRejected, return Err(InvalidStage)
//!   ├─► PollStarted
//!   │
//!   ├─► for (index, stage) in plan:
//!   │     ├─► deadline = wait_delay(stage.duration)          (armed once per stage)
//!   │     ├─► StageStarted
//!   │     ├─► resolve_cycle(probe, StageGate { interval, deadline, interrupt })
//!   │     │       ├─ Err(e)     ─► ProbeFailed, return Err(Probe(e))
//!   │     │       ├─ Some(v)    ─► PollDone, return Done(v)
//!   │     │       └─ None
//!   │     └─► has_interruption(deadline, interrupt)
//!   │             ├─ true       ─► PollInterrupted, return Interrupted
//!   │             └─ false      ─► StageExpired, next stage
//!   │
//!   └─► PollTimedOut, return TimeoutExpired
//! ```
//!
//! ## Rules
//! - Validation happens **before** any timer starts or any probe runs.
//! - One probe call in flight at a time; an in-flight call is never cancelled.
//! - Interruption is observed only between probe calls; a value returned by the
//!   probe always wins.
//! - When no interruption token is configured, a private one is created per poll
//!   and dropped when the poll returns.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    config::Config,
    core::{
        builder::PollerBuilder,
        cycle::{StageGate, resolve_cycle},
        delay::wait_delay,
        interruption::has_interruption,
        outcome::Outcome,
    },
    error::PollError,
    events::{Event, EventKind},
    probes::Probe,
    stages::{Stage, validate_stages},
    subscribers::SubscriberSet,
};

/// Staged, interruptible poller.
///
/// A poller is reusable: each [`Poller::poll`] call is independent and produces
/// exactly one [`Outcome`] or one [`PollError`].
pub struct Poller {
    cfg: Config,
    interrupt: Option<CancellationToken>,
    subs: SubscriberSet,
}

impl Poller {
    /// Creates a poller with the given configuration, no interruption and no subscribers.
    pub fn new(cfg: Config) -> Self {
        Self::new_internal(cfg, None, SubscriberSet::default())
    }

    /// Returns a builder for a poller with interruption and/or subscribers.
    pub fn builder(cfg: Config) -> PollerBuilder {
        PollerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        interrupt: Option<CancellationToken>,
        subs: SubscriberSet,
    ) -> Self {
        Self {
            cfg,
            interrupt,
            subs,
        }
    }

    /// The stage plan, in processing order.
    pub fn stages(&self) -> &[Stage] {
        &self.cfg.stages
    }

    /// The configured interruption token, if any.
    pub fn interrupt(&self) -> Option<&CancellationToken> {
        self.interrupt.as_ref()
    }

    /// Polls `probe` through every stage until it yields a value, the plan is
    /// exhausted, or the interruption token is cancelled.
    ///
    /// ### Errors
    /// - [`PollError::InvalidStage`] if any stage breaks a range rule (nothing is probed);
    /// - [`PollError::Probe`] if the probe fails (no outcome is produced).
    pub async fn poll<P>(&self, probe: &P) -> Result<Outcome<P::Output>, PollError>
    where
        P: Probe + ?Sized,
    {
        let name: Arc<str> = Arc::from(probe.name());
        let events = &self.subs.scoped(Arc::clone(&name));

        if let Err(err) = validate_stages(&self.cfg.stages) {
            if let PollError::InvalidStage {
                index, violation, ..
            } = &err
            {
                events.emit(
                    Event::new(EventKind::StageRejected)
                        .with_stage(*index)
                        .with_reason(violation.to_string()),
                );
            }
            return Err(err);
        }

        let fallback;
        let interrupt = match &self.interrupt {
            Some(token) => token,
            None => {
                fallback = CancellationToken::new();
                &fallback
            }
        };

        let budget_ms = self.cfg.total_budget_ms().unsigned_abs();
        debug!(probe = &*name, stages = self.cfg.stages.len(), budget_ms, "poll started");
        events.emit(
            Event::new(EventKind::PollStarted)
                .with_stages(self.cfg.stages.len())
                .with_duration(Duration::from_millis(budget_ms)),
        );

        let mut attempts: u64 = 0;
        for (index, stage) in self.cfg.stages.iter().enumerate() {
            let mut deadline = wait_delay(stage.duration());
            debug!(
                probe = &*name,
                stage = index,
                duration_ms = stage.duration_ms,
                interval_ms = stage.interval_ms,
                "stage started"
            );
            events.emit(
                Event::new(EventKind::StageStarted)
                    .with_stage(index)
                    .with_duration(stage.duration())
                    .with_interval(stage.interval()),
            );

            let mut gate = StageGate::new(stage.interval(), &mut deadline, interrupt);
            let query = || {
                attempts += 1;
                let attempt = attempts;
                let name = Arc::clone(&name);
                async move {
                    let res = probe.query().await;
                    match &res {
                        Ok(Some(_)) => {}
                        Ok(None) => {
                            trace!(probe = &*name, stage = index, attempt, "probe empty");
                            events.emit(
                                Event::new(EventKind::ProbeEmpty)
                                    .with_stage(index)
                                    .with_attempt(attempt),
                            );
                        }
                        Err(e) => {
                            warn!(
                                probe = &*name,
                                stage = index,
                                attempt,
                                error = %e,
                                "probe failed"
                            );
                            events.emit(
                                Event::new(EventKind::ProbeFailed)
                                    .with_stage(index)
                                    .with_attempt(attempt)
                                    .with_reason(e.to_string()),
                            );
                        }
                    }
                    res
                }
            };

            if let Some(value) = resolve_cycle(query, &mut gate).await? {
                debug!(probe = &*name, stage = index, attempt = attempts, "poll done");
                events.emit(
                    Event::new(EventKind::PollDone)
                        .with_stage(index)
                        .with_attempt(attempts),
                );
                return Ok(Outcome::Done(value));
            }

            if has_interruption(&mut deadline, interrupt.cancelled()).await {
                debug!(probe = &*name, stage = index, attempt = attempts, "poll interrupted");
                events.emit(
                    Event::new(EventKind::PollInterrupted)
                        .with_stage(index)
                        .with_attempt(attempts),
                );
                return Ok(Outcome::Interrupted);
            }

            debug!(probe = &*name, stage = index, attempt = attempts, "stage expired");
            events.emit(
                Event::new(EventKind::StageExpired)
                    .with_stage(index)
                    .with_attempt(attempts),
            );
        }

        debug!(probe = &*name, attempt = attempts, "poll timed out");
        events.emit(Event::new(EventKind::PollTimedOut).with_attempt(attempts));
        Ok(Outcome::TimeoutExpired)
    }

    /// Consumes the poller and waits until every subscriber has drained its queue.
    pub async fn close(self) {
        self.subs.shutdown().await;
    }
}

/// Polls `probe` once through `stages`, optionally interruptible.
///
/// - `stages = None` uses [`Config::default`] (one 24h stage probing every second);
/// - `interrupt = None` never interrupts.
///
/// # Example
/// ```rust
/// use stagepoll::{Outcome, ProbeError, ProbeFn, Stage, query_poller};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let probe = ProbeFn::new("ready", || async { Ok::<_, ProbeError>(Some("ready")) });
/// let outcome = query_poller(&probe, Some(&[Stage::new(1_000, 100)]), None).await?;
/// assert_eq!(outcome, Outcome::Done("ready"));
/// # Ok(())
/// # }
/// ```
pub async fn query_poller<P>(
    probe: &P,
    stages: Option<&[Stage]>,
    interrupt: Option<CancellationToken>,
) -> Result<Outcome<P::Output>, PollError>
where
    P: Probe + ?Sized,
{
    let cfg = match stages {
        Some(stages) => Config::with_stages(stages),
        None => Config::default(),
    };
    Poller::new_internal(cfg, interrupt, SubscriberSet::default())
        .poll(probe)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::time::{self, Instant};

    use crate::error::{ProbeError, RangeViolation};
    use crate::probes::ProbeFn;
    use crate::subscribers::Subscribe;

    /// Probe that answers `None` `misses` times, then `Some(value)`; counts calls.
    fn eventually<T: Clone + Send + Sync + 'static>(
        calls: &Arc<AtomicUsize>,
        misses: usize,
        value: T,
    ) -> impl Probe<Output = T> {
        let calls = Arc::clone(calls);
        ProbeFn::new("eventually", move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let value = value.clone();
            async move { Ok::<_, ProbeError>((n >= misses).then_some(value)) }
        })
    }

    fn never(calls: &Arc<AtomicUsize>) -> impl Probe<Output = u32> {
        eventually(calls, usize::MAX, 0u32)
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Event>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(event.clone());
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_value_needs_no_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = Poller::new(Config::with_stages([Stage::new(5_000, 100)]));

        let start = Instant::now();
        let outcome = poller.poll(&eventually(&calls, 0, "row")).await.unwrap();

        assert_eq!(outcome, Outcome::Done("row"));
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_on_third_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stages = [Stage::new(5_000, 100)];

        let start = Instant::now();
        let outcome = query_poller(&eventually(&calls, 2, 42u64), Some(&stages), None)
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcome, Outcome::Done(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(elapsed >= Duration::from_millis(200), "too early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(300), "too late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_falsy_values_are_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = query_poller(&eventually(&calls, 0, 0i32), None, None)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Done(0));

        let outcome = query_poller(&eventually(&calls, 0, String::new()), None, None)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Done(String::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_stages_exhausted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stages = [Stage::new(200, 50), Stage::new(300, 100)];

        let start = Instant::now();
        let outcome = query_poller(&never(&calls), Some(&stages), None).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcome, Outcome::TimeoutExpired);
        assert!(elapsed >= Duration::from_millis(500), "too early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "too late: {elapsed:?}");
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_plan_never_probes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = query_poller(&never(&calls), Some(&[]), None).await.unwrap();

        assert_eq!(outcome, Outcome::TimeoutExpired);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_duration_rejected_before_probing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let err = query_poller(&never(&calls), Some(&[Stage::new(-1, 10)]), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PollError::InvalidStage {
                index: 0,
                violation: RangeViolation::Negative,
                ..
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_infinite_interval_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stages = [Stage::new(100, 10), Stage::new(1_000, Stage::UNBOUNDED)];
        let err = query_poller(&never(&calls), Some(&stages), None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("interval can't be infinite"));
        assert!(matches!(err, PollError::InvalidStage { index: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_over_ceiling_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stages = [Stage::new(crate::config::MAX_TIMEOUT_MS + 1, 1_000)];
        let err = query_poller(&never(&calls), Some(&stages), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PollError::InvalidStage {
                violation: RangeViolation::ExceedsMaxTimeout,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_failure_propagates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let probe = ProbeFn::new("broken", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 1 {
                    Err(ProbeError::fail("connection reset"))
                } else {
                    Ok::<Option<u8>, _>(None)
                }
            }
        });

        let err = query_poller(&probe, Some(&[Stage::new(1_000, 10)]), None)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Probe(ProbeError::Failed { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_before_stage_ends() {
        let calls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(150)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let stages = [Stage::new(10_000, 100), Stage::new(10_000, 100)];
        let outcome = query_poller(&never(&calls), Some(&stages), Some(token))
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcome, Outcome::Interrupted);
        assert!(elapsed >= Duration::from_millis(150));
        assert!(elapsed < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_interrupted_probes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        token.cancel();

        let outcome = query_poller(&never(&calls), None, Some(token)).await.unwrap();

        assert_eq!(outcome, Outcome::Interrupted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_wins_over_interruption() {
        let calls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        token.cancel();

        let outcome = query_poller(&eventually(&calls, 0, 5u8), None, Some(token))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Done(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interruption_wins_tie_with_deadline() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        // The first call outlives the stage deadline and interrupts on its way out,
        // so both signals are ready when the stage ends.
        let probe = ProbeFn::new("slow", move || {
            let trigger = trigger.clone();
            async move {
                time::sleep(Duration::from_millis(200)).await;
                trigger.cancel();
                Ok::<Option<u8>, ProbeError>(None)
            }
        });

        let stages = [Stage::new(100, 10), Stage::new(1_000, 10)];
        let outcome = query_poller(&probe, Some(&stages), Some(token)).await.unwrap();

        assert_eq!(outcome, Outcome::Interrupted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_is_not_cancelled_by_deadline() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let probe = ProbeFn::new("slow", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                time::sleep(Duration::from_millis(200)).await;
                Ok::<Option<u8>, ProbeError>(None)
            }
        });

        let start = Instant::now();
        let outcome = query_poller(&probe, Some(&[Stage::new(100, 10)]), None)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::TimeoutExpired);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_probe_in_flight() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));
        let probe = ProbeFn::new("tracked", move || {
            let (f, p) = (Arc::clone(&f), Arc::clone(&p));
            async move {
                let now = f.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                time::sleep(Duration::from_millis(30)).await;
                f.fetch_sub(1, Ordering::SeqCst);
                Ok::<Option<u8>, ProbeError>(None)
            }
        });

        let outcome = query_poller(&probe, Some(&[Stage::new(300, 0)]), None)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::TimeoutExpired);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_plan_probes_every_second() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = Poller::new(Config::default());

        let start = Instant::now();
        let outcome = poller.poll(&eventually(&calls, 2, 'x')).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcome, Outcome::Done('x'));
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_follow_stage_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rec = Arc::new(Recorder::default());
        let poller = Poller::builder(Config::default())
            .with_stages([Stage::new(100, 40), Stage::new(100, 40)])
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .build();

        let outcome = poller.poll(&never(&calls)).await.unwrap();
        poller.close().await;

        assert_eq!(outcome, Outcome::TimeoutExpired);
        let seen = rec.seen.lock().unwrap().clone();
        let kinds: Vec<(EventKind, Option<usize>)> = seen
            .iter()
            .filter(|e| e.kind != EventKind::ProbeEmpty)
            .map(|e| (e.kind, e.stage))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (EventKind::PollStarted, None),
                (EventKind::StageStarted, Some(0)),
                (EventKind::StageExpired, Some(0)),
                (EventKind::StageStarted, Some(1)),
                (EventKind::StageExpired, Some(1)),
                (EventKind::PollTimedOut, None),
            ]
        );
        let empties = seen.iter().filter(|e| e.kind == EventKind::ProbeEmpty).count();
        assert_eq!(empties, calls.load(Ordering::SeqCst));
        assert!(seen.windows(2).all(|w| w[0].seq < w[1].seq));
        assert!(seen.iter().all(|e| e.probe.as_deref() == Some("eventually")));
        assert_eq!(seen[0].stages, Some(2));
        assert_eq!(seen[0].duration_ms, Some(200));
    }

    /// Buffers one event and needs ten seconds for each.
    struct Stalled;

    #[async_trait]
    impl Subscribe for Stalled {
        async fn on_event(&self, _event: &Event) {
            time::sleep(Duration::from_secs(10)).await;
        }

        fn name(&self) -> &'static str {
            "stalled"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_subscriber_keeps_poll_schedule() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rec = Arc::new(Recorder::default());
        let poller = Poller::builder(Config::with_stages([
            Stage::new(200, 50),
            Stage::new(300, 100),
        ]))
        .with_subscribers(vec![
            Arc::new(Stalled) as Arc<dyn Subscribe>,
            rec.clone() as Arc<dyn Subscribe>,
        ])
        .build();

        let start = Instant::now();
        let outcome = poller.poll(&never(&calls)).await.unwrap();
        let elapsed = start.elapsed();
        poller.close().await;

        assert_eq!(outcome, Outcome::TimeoutExpired);
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(600));

        let seen = rec.seen.lock().unwrap().clone();
        let empties = seen.iter().filter(|e| e.kind == EventKind::ProbeEmpty).count();
        assert_eq!(empties, calls.load(Ordering::SeqCst));
        assert_eq!(seen.iter().filter(|e| e.kind == EventKind::PollTimedOut).count(), 1);
        assert!(seen.iter().any(|e| {
            e.kind == EventKind::SubscriberOverflow
                && e.subscriber.as_deref() == Some("stalled")
                && e.probe.as_deref() == Some("eventually")
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_plan_emits_event() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rec = Arc::new(Recorder::default());
        let poller = Poller::builder(Config::with_stages([Stage::new(10, -3)]))
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .build();

        assert!(poller.poll(&never(&calls)).await.is_err());
        poller.close().await;

        let seen = rec.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, EventKind::StageRejected);
        assert_eq!(seen[0].reason.as_deref(), Some("timeout values must be positive"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_builder_interrupt_is_reused_across_polls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let poller = Poller::builder(Config::with_stages([Stage::new(50, 10)]))
            .with_interrupt(token.clone())
            .build();
        assert_eq!(poller.stages(), &[Stage::new(50, 10)]);
        assert!(poller.interrupt().is_some_and(|t| !t.is_cancelled()));

        assert_eq!(poller.poll(&never(&calls)).await.unwrap(), Outcome::TimeoutExpired);
        token.cancel();
        assert_eq!(poller.poll(&never(&calls)).await.unwrap(), Outcome::Interrupted);
    }
}
