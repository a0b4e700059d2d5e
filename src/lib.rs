//! # stagepoll
//!
//! **stagepoll** waits for eventually-consistent results without busy-looping and
//! without waiting forever.
//!
//! Given an async [`Probe`] that may not have a result yet, a [`Poller`] calls it
//! repeatedly across an ordered plan of [`Stage`]s (each with its own maximum
//! duration and repeat interval) until the probe yields a value, every stage runs
//! out, or an external interruption token is cancelled.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐        ┌──────────────────────────┐
//!     │    Probe     │        │  Vec<Stage>              │
//!     │ (user query) │        │  [{10s, 250ms}, {5m, 5s}]│
//!     └──────┬───────┘        └────────────┬─────────────┘
//!            ▼                             ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Poller                                                           │
//! │  - validate_stages (before any timer or probe)                    │
//! │  - per stage: deadline Delay + StageGate + resolve_cycle          │
//! │  - has_interruption after each stage (interruption wins ties)     │
//! │  - SubscriberSet (fans out lifecycle events)                      │
//! └──────┬──────────────────────────────┬─────────────────────────────┘
//!        ▼                              ▼
//!   Outcome::{Done, TimeoutExpired,   PollError::{InvalidStage, Probe}
//!             Interrupted}
//! ```
//!
//! ### Lifecycle
//! ```text
//! for stage in plan {
//!   ├─► deadline = wait_delay(stage.duration)
//!   ├─► loop {
//!   │     ├─► probe.query()  ── Some(v) ─► Done(v)
//!   │     │                  ── Err(e)  ─► Err(Probe(e))
//!   │     └─► race (biased):
//!   │           interruption   ─► stop
//!   │           deadline       ─► stop
//!   │           interval Delay ─► probe again
//!   │   }
//!   └─► interrupted? ─► Interrupted : next stage
//! }
//! TimeoutExpired
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Polling**       | Staged, interruptible polling of one probe.                  | [`Poller`], [`query_poller`], [`Outcome`] |
//! | **Stages**        | Escalating duration/interval windows, validated up front.    | [`Stage`], [`validate_stages`]            |
//! | **Probes**        | Define probes as closures or trait impls.                    | [`Probe`], [`ProbeFn`], [`ProbeRef`]      |
//! | **Subscriber API**| Observe poll lifecycle events.                               | [`Subscribe`], [`Event`]                  |
//! | **Errors**        | Typed configuration and probe errors.                        | [`PollError`], [`ProbeError`]             |
//! | **Configuration** | Default plan and time-unit constants.                        | [`Config`], [`config::MAX_TIMEOUT_MS`]    |
//!
//! ## Optional features
//! - `logging`: exports a [`LogWriter`] subscriber that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use tokio_util::sync::CancellationToken;
//! use stagepoll::{Config, Outcome, Poller, ProbeError, ProbeFn, Stage};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let calls = Arc::new(AtomicU32::new(0));
//!     let seen = calls.clone();
//!
//!     // Result "materializes" on the third query.
//!     let probe = ProbeFn::new("report", move || {
//!         let n = seen.fetch_add(1, Ordering::SeqCst);
//!         async move { Ok::<_, ProbeError>((n >= 2).then_some("report.csv")) }
//!     });
//!
//!     let poller = Poller::builder(Config::default())
//!         .with_stages([Stage::new(1_000, 10), Stage::new(5_000, 100)])
//!         .with_interrupt(CancellationToken::new())
//!         .build();
//!
//!     let outcome = poller.poll(&probe).await?;
//!     assert_eq!(outcome, Outcome::Done("report.csv"));
//!     assert_eq!(calls.load(Ordering::SeqCst), 3);
//!     Ok(())
//! }
//! ```
pub mod config;
mod core;
mod error;
mod events;
mod probes;
mod stages;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{
    Delay, Outcome, Poller, PollerBuilder, Status, interrupt_on_shutdown_signal, query_poller,
    wait_delay, wait_for_shutdown_signal,
};
pub use error::{PollError, ProbeError, RangeViolation};
pub use events::{Event, EventKind};
pub use probes::{Probe, ProbeFn, ProbeRef};
pub use stages::{Stage, validate_stages};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a `tracing`-backed logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
