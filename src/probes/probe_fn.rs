//! # Function-backed probe (`ProbeFn`)
//!
//! [`ProbeFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per query.
//! No hidden state is carried between calls; if the probe needs shared state,
//! capture an `Arc<...>` explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use stagepoll::{ProbeFn, ProbeRef, ProbeError};
//!
//! let p: ProbeRef<u64> = ProbeFn::arc("row-count", || async {
//!     // run a query...
//!     Ok::<_, ProbeError>(Some(42))
//! });
//!
//! assert_eq!(p.name(), "row-count");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::probes::probe::Probe;

/// Closure-backed probe implementation.
#[derive(Debug)]
pub struct ProbeFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProbeFn<F> {
    /// Creates a new function-backed probe.
    ///
    /// Prefer [`ProbeFn::arc`] when you immediately need a [`ProbeRef`](crate::ProbeRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the probe and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, T> Probe for ProbeFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<T>, ProbeError>> + Send,
    T: Send,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self) -> Result<Option<T>, ProbeError> {
        (self.f)().await
    }
}
