//! Poll events: types.
//!
//! This module holds the event **data model** emitted by the poller while it
//! walks a stage plan.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: `Poller::poll` (plan, stage, probe and terminal events).
//! - **Consumers**: user [`Subscribe`](crate::Subscribe) implementations, fanned out
//!   through [`SubscriberSet`](crate::SubscriberSet).

mod event;

pub use event::{Event, EventKind};
