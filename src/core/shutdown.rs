//! # Shutdown signals as poll interruption.
//!
//! A poll that waits for hours should end promptly when the process is asked to stop.
//! [`interrupt_on_shutdown_signal`] hands out a [`CancellationToken`] that is cancelled
//! on the first termination signal; pass it to
//! [`PollerBuilder::with_interrupt`](crate::PollerBuilder::with_interrupt) or
//! [`query_poller`](crate::query_poller) and the poll reports
//! [`Outcome::Interrupted`](crate::Outcome::Interrupted) at its next decision point.
//!
//! Observed signals: `SIGINT`, `SIGTERM` and `SIGQUIT` on unix, Ctrl-C elsewhere.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Resolves once the process receives a termination signal.
///
/// Handlers are installed on every call. A registration failure is returned
/// before any waiting happens.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
        _ = quit.recv() => {}
    }
    Ok(())
}

/// Resolves once the process receives Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Returns a token that is cancelled when the process receives a termination signal.
///
/// A listener task is spawned on the current tokio runtime. It ends on the first
/// signal, or as soon as the token is cancelled by anyone else, so cancelling the
/// token is how a caller releases it.
pub fn interrupt_on_shutdown_signal() -> CancellationToken {
    let token = CancellationToken::new();
    let _ = spawn_listener(token.clone());
    token
}

fn spawn_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_shutdown_signal() => match res {
                Ok(()) => {
                    debug!("shutdown signal received; interrupting polls");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "cannot listen for shutdown signals"),
            },
            _ = token.cancelled() => {}
        }
    })
}
