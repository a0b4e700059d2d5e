//! # Probe trait.
//!
//! A [`Probe`] answers one question per call: "is the result there yet?"
//! - `Ok(Some(value))` the result is available; polling stops with `Done`;
//! - `Ok(None)` not yet; the poller waits for the next interval;
//! - `Err(ProbeError)` the probe is broken; the poll aborts and the error is returned.
//!
//! `None` is the only absent marker. `Some(0)`, `Some("")` and `Some(false)` are
//! real results.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProbeError;

/// Shared handle to a probe.
pub type ProbeRef<T> = Arc<dyn Probe<Output = T>>;

/// # Asynchronous, repeatable query.
///
/// The poller never issues a call while a previous one is still pending,
/// and never cancels an in-flight call.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use stagepoll::{Probe, ProbeError};
///
/// struct JobStatus;
///
/// #[async_trait]
/// impl Probe for JobStatus {
///     type Output = String;
///
///     fn name(&self) -> &str { "job-status" }
///
///     async fn query(&self) -> Result<Option<String>, ProbeError> {
///         // ask a remote service...
///         Ok(Some("finished".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Probe: Send + Sync {
    /// Value produced once the result is available.
    type Output: Send;

    /// Returns a stable, human-readable probe name used in events and logs.
    fn name(&self) -> &str {
        "probe"
    }

    /// Queries once.
    async fn query(&self) -> Result<Option<Self::Output>, ProbeError>;
}

#[async_trait]
impl<P: Probe + ?Sized> Probe for Arc<P> {
    type Output = P::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn query(&self) -> Result<Option<Self::Output>, ProbeError> {
        (**self).query().await
    }
}
