//! Shutdown signal handling.

use tokio::signal;

/// Resolve when the process is asked to stop (Ctrl-C, or SIGTERM on unix).
///
/// # Errors
///
/// Returns an error if a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => {
                res?;
                tracing::info!("Received Ctrl+C signal");
            }
            _ = terminate.recv() => tracing::info!("Received SIGTERM signal"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        tracing::info!("Received Ctrl+C signal");
    }

    Ok(())
}
