// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal handling for an in-progress dispatch.
//!
//! SIGINT (Ctrl+C) and SIGTERM cancel the returned [`CancellationToken`].
//! The dispatcher stops admitting recipients, lets in-flight sends finish,
//! and reports everything else as skipped.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Installs handlers for SIGTERM and SIGINT and returns the token they cancel.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => warn!("received SIGINT (Ctrl+C), finishing in-flight sends"),
                        _ = sigterm.recv() => warn!("received SIGTERM, finishing in-flight sends"),
                        _ = trigger.cancelled() => return,
                    }
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "failed to install SIGTERM handler, only Ctrl+C is handled"
                    );
                    tokio::select! {
                        _ = ctrl_c => warn!("received Ctrl+C, finishing in-flight sends"),
                        _ = trigger.cancelled() => return,
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = ctrl_c => warn!("received Ctrl+C, finishing in-flight sends"),
                _ = trigger.cancelled() => return,
            }
        }

        trigger.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_live_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        // Cancelling manually also ends the background task.
        token.cancel();
        assert!(token.is_cancelled());
    }
}
