//! # SubscriberSet: event delivery for a running poll
//!
//! A poll publishes events from inside its timing loop, between probe calls. Publishing
//! must therefore cost a `try_send` per subscriber and nothing more: a subscriber that
//! falls behind loses events, it never stretches a stage.
//!
//! Each subscriber owns a *lane*: a bounded queue drained by one worker task.
//!
//! ```text
//!   Poller::poll
//!       │ scoped(probe) ─► PollEmitter (stamps the probe name)
//!       ▼
//!   emit(Event) ──try_send──► lane A ─► worker A ─► A::on_event
//!       │       ──try_send──► lane B ─► worker B ─► B::on_event ── panic ─┐
//!       │                       │ full                                    │
//!       ▼                       ▼                                         ▼
//!   SubscriberOverflow ──► every lane          SubscriberPanicked ──► every lane
//! ```
//!
//! ## Delivery reports
//! - A full or closed lane drops the event for that subscriber only. A
//!   [`SubscriberOverflow`](EventKind::SubscriberOverflow) naming it is offered to every lane.
//! - A panic in `on_event` is caught in the worker. A
//!   [`SubscriberPanicked`](EventKind::SubscriberPanicked) is offered to every lane still open.
//! - Reports carry the probe, stage and attempt of the event they are about.
//! - A report that cannot be delivered, or that makes a subscriber panic, is only logged.
//!
//! Workers hold weak handles to the lanes, so dropping the set closes every queue.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tracing::{error, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

type Inbox = mpsc::Receiver<Arc<Event>>;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Per-subscriber queues and workers for one [`Poller`](crate::Poller).
#[derive(Default)]
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Opens one lane per subscriber and starts its worker.
    ///
    /// Must be called from within a tokio runtime unless `subs` is empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut inboxes = Vec::with_capacity(subs.len());
        for sub in &subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                tx,
            });
            inboxes.push(rx);
        }

        let peers: Arc<[mpsc::WeakSender<Arc<Event>>]> =
            lanes.iter().map(|lane| lane.tx.downgrade()).collect();
        let workers = subs
            .into_iter()
            .zip(inboxes)
            .map(|(sub, inbox)| tokio::spawn(drain_lane(sub, inbox, Arc::clone(&peers))))
            .collect();

        Self { lanes, workers }
    }

    /// Offers `event` to every lane without waiting.
    ///
    /// A lane that cannot take it loses it; the loss is logged and reported to every
    /// lane as [`EventKind::SubscriberOverflow`] unless `event` is itself a report.
    pub fn emit(&self, event: Event) {
        if self.lanes.is_empty() {
            return;
        }
        let ev = Arc::new(event);

        let mut lost = Vec::new();
        for lane in &self.lanes {
            let why = match lane.tx.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "queue full",
                Err(TrySendError::Closed(_)) => "worker closed",
            };
            warn!(subscriber = lane.name, seq = ev.seq, kind = ?ev.kind, "event dropped: {why}");
            lost.push((lane.name, why));
        }
        if ev.kind.is_delivery_report() {
            return;
        }

        for (name, why) in lost {
            let reason = format!("{why}, dropped seq {}", ev.seq);
            let report = Arc::new(report_on(EventKind::SubscriberOverflow, name, &ev, reason));
            for lane in &self.lanes {
                let _ = lane.tx.try_send(Arc::clone(&report));
            }
        }
    }

    /// Returns an emitter that tags every event with `probe`.
    pub(crate) fn scoped(&self, probe: Arc<str>) -> PollEmitter<'_> {
        PollEmitter { set: self, probe }
    }

    /// Closes every lane and waits until the workers have drained them.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}

/// Publishing handle for a single poll.
pub(crate) struct PollEmitter<'a> {
    set: &'a SubscriberSet,
    probe: Arc<str>,
}

impl PollEmitter<'_> {
    pub(crate) fn emit(&self, event: Event) {
        if !self.set.is_empty() {
            self.set.emit(event.with_probe(Arc::clone(&self.probe)));
        }
    }
}

async fn drain_lane(
    sub: Arc<dyn Subscribe>,
    mut inbox: Inbox,
    peers: Arc<[mpsc::WeakSender<Arc<Event>>]>,
) {
    while let Some(ev) = inbox.recv().await {
        let handled = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        let Err(panic) = handled else {
            continue;
        };

        let msg = panic_message(panic.as_ref());
        error!(
            subscriber = sub.name(),
            seq = ev.seq,
            kind = ?ev.kind,
            "subscriber panicked: {msg}"
        );
        if ev.kind.is_delivery_report() {
            continue;
        }

        let report = Arc::new(report_on(EventKind::SubscriberPanicked, sub.name(), &ev, msg));
        for peer in peers.iter().filter_map(mpsc::WeakSender::upgrade) {
            let _ = peer.try_send(Arc::clone(&report));
        }
    }
}

/// Builds a delivery report about `about` for the subscriber `name`.
fn report_on(
    kind: EventKind,
    name: &'static str,
    about: &Event,
    reason: impl Into<Arc<str>>,
) -> Event {
    let mut report = Event::new(kind).with_subscriber(name).with_reason(reason);
    report.probe = about.probe.clone();
    report.stage = about.stage;
    report.attempt = about.attempt;
    report
}

fn panic_message(err: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = err.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
