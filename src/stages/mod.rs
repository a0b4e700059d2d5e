//! Stage plans.
//!
//! A poll walks an ordered list of [`Stage`]s. Each stage bounds **how long** the
//! poller keeps trying and **how often** it probes while doing so.
//!
//! ## Contents
//! - [`Stage`] one `{ duration_ms, interval_ms }` window
//! - [`validate_stages`] the up-front range check run before any timer starts
//!
//! ## Quick wiring
//! ```text
//! Config { stages: Vec<Stage> }
//!      └─► Poller::poll():
//!           - validate_stages(&stages)          (first violation wins)
//!           - for each stage: deadline = duration, cadence = interval
//! ```
//!
//! ## Example plan
//! ```text
//! [ Stage { 10s, 250ms },   poll fast while the result is likely close
//!   Stage { 5min, 5s } ]    then back off to a slow cadence
//! ```

mod stage;

pub use stage::{Stage, validate_stages};
