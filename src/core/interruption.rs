//! # Post-stage interruption check.
//!
//! When a stage ends without a result, the poller must tell apart "this stage ran
//! out of time" from "the caller interrupted us". [`has_interruption`] races the two
//! signals with interruption polled first, so a tie is always reported as an
//! interruption.
//!
//! ## Truth table
//! ```text
//! stage_timeout   interrupted   result
//! pending         ready         true
//! ready           pending       false
//! ready           ready         true
//! ```
//!
//! ## Precondition
//! At least one signal must already be ready; otherwise the check waits for
//! whichever fires first.

use std::future::Future;

/// Returns `true` if `interrupted` is ready, `false` if only `stage_timeout` is.
pub async fn has_interruption<T, I>(stage_timeout: T, interrupted: I) -> bool
where
    T: Future,
    I: Future,
{
    tokio::select! {
        biased;
        _ = interrupted => true,
        _ = stage_timeout => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{pending, ready};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    use crate::core::delay::wait_delay;

    #[tokio::test]
    async fn test_only_interrupted_ready() {
        assert!(has_interruption(pending::<()>(), ready(())).await);
    }

    #[tokio::test]
    async fn test_only_timeout_ready() {
        assert!(!has_interruption(ready(()), pending::<()>()).await);
    }

    #[tokio::test]
    async fn test_both_ready_reports_interruption() {
        assert!(has_interruption(ready(()), ready(())).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_deadline_and_cancelled_token() {
        let token = CancellationToken::new();
        let mut deadline = wait_delay(Duration::from_millis(5));
        (&mut deadline).await;
        token.cancel();

        assert!(has_interruption(&mut deadline, token.cancelled()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_deadline_without_interruption() {
        let token = CancellationToken::new();
        let mut deadline = wait_delay(Duration::from_millis(5));
        (&mut deadline).await;

        assert!(!has_interruption(&mut deadline, token.cancelled()).await);
    }
}
