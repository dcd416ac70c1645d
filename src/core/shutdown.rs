use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Resolves on Ctrl+C / SIGTERM and cancels `root`, which tears down every
/// staged continuation spawned from a child of it.
pub(crate) async fn shutdown_signal(root: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = root.cancelled() => {},
    }

    tracing::info!("shutdown signal received, cancelling pending stages");
    root.cancel();
}
