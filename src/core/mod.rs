//! Poll core: timers, the per-stage cycle and the orchestrating poller.
//!
//! The public API from this module is [`Poller`] (with [`PollerBuilder`]),
//! [`query_poller`], [`Outcome`], the [`Delay`] primitive and the
//! shutdown-signal helpers.
//!
//! Internal modules:
//! - [`delay`]: fused timer that always yields once before firing;
//! - [`interruption`]: post-stage check with interruption priority;
//! - [`cycle`]: probe/wait loop of a single stage and its continuation gate;
//! - [`poller`]: validates the plan and walks the stages;
//! - [`builder`]: assembles a poller with interruption and subscribers;
//! - [`outcome`]: terminal result types;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod cycle;
mod delay;
mod interruption;
mod outcome;
mod poller;
mod shutdown;

pub use builder::PollerBuilder;
pub use delay::{Delay, wait_delay};
pub use outcome::{Outcome, Status};
pub use poller::{Poller, query_poller};
pub use shutdown::{interrupt_on_shutdown_signal, wait_for_shutdown_signal};
