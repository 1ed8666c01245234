use std::future::Future;

use tracing::{error, info};

/// A future-based shutdown signal that resolves on `SIGINT` (Ctrl-C) or, on unix systems,
/// `SIGTERM`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShutdownSignal;

impl ShutdownSignal {
    /// Creates a new [`ShutdownSignal`].
    pub const fn new() -> Self {
        Self
    }

    /// Waits until a shutdown signal is received by the process.
    pub async fn recv(self) {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!(?e, "Failed to install SIGTERM handler, only listening for Ctrl-C");
                    wait_for_ctrl_c().await;
                    return;
                }
            };

            tokio::select! {
                _ = wait_for_ctrl_c() => info!("Received SIGINT"),
                _ = sigterm.recv() => info!("Received SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            wait_for_ctrl_c().await;
            info!("Received SIGINT");
        }
    }
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "Failed to listen for Ctrl-C");
        // Never resolve: a broken signal handler must not be mistaken for a shutdown request.
        std::future::pending::<()>().await;
    }
}

/// Run `fut` until it completes or until `signal` fires, whichever comes first.
///
/// `on_shutdown` is invoked in both cases, before returning. An error returned by `fut` is
/// propagated to the caller.
pub async fn run_until_shutdown<F, T, E>(
    fut: F,
    signal: ShutdownSignal,
    on_shutdown: impl FnOnce(),
) -> eyre::Result<()>
where
    F: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let res = tokio::select! {
        res = fut => res.map(|_| ()).map_err(eyre::Report::from),
        () = signal.recv() => Ok(()),
    };

    on_shutdown();

    res
}
