//! # Probe abstractions.
//!
//! A probe is the caller-owned query the poller repeats until it yields a value:
//! - [`Probe`] - trait for implementing async probes
//! - [`ProbeFn`] - closure-backed probe implementation
//! - [`ProbeRef`] - shared reference to a probe (`Arc<dyn Probe<Output = T>>`)

mod probe;
mod probe_fn;

pub use probe::{Probe, ProbeRef};
pub use probe_fn::ProbeFn;
