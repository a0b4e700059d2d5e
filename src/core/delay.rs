//! # Delay primitive.
//!
//! [`Delay`] is a timer future built on [`tokio::time::Sleep`] with two properties
//! the poller relies on:
//! - it **always yields** to the scheduler once before it can complete, even for a
//!   zero duration, so a zero-length timer never wins a race synchronously;
//! - it is **fused**: once elapsed, polling it again returns `Ready` immediately,
//!   so a stage deadline can be raced many times and re-checked afterwards.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::time::{self, Sleep};

/// Returns a [`Delay`] that completes `delay` after this call.
pub fn wait_delay(delay: Duration) -> Delay {
    Delay::new(delay)
}

/// Timer that completes after a fixed duration, measured from creation.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Delay {
    sleep: Pin<Box<Sleep>>,
    yielded: bool,
}

impl Delay {
    /// Starts a new delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            sleep: Box::pin(time::sleep(delay)),
            yielded: false,
        }
    }

    /// Returns `true` once the underlying timer has fired.
    pub fn is_elapsed(&self) -> bool {
        self.sleep.is_elapsed()
    }
}

impl Future for Delay {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if !self.yielded {
            self.yielded = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        self.sleep.as_mut().poll(cx)
    }
}
