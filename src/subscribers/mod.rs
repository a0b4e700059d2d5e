//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out
//! used by the poller to deliver [`Event`](crate::Event)s without blocking a poll.
//! Lost events and subscriber panics are themselves delivered as events
//! (`SubscriberOverflow`, `SubscriberPanicked`).
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use stagepoll::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct MetricsSubscriber;
//!
//! #[async_trait]
//! impl Subscribe for MetricsSubscriber {
//!     async fn on_event(&self, event: &Event) {
//!         match event.kind {
//!             EventKind::PollTimedOut => { /* increment timeout counter */ }
//!             EventKind::SubscriberOverflow => { /* counters may now be low */ }
//!             _ => {}
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "metrics"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
