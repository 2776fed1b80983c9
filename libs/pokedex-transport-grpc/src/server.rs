//! TCP hosting for tonic routes.
//!
//! The server binds first so the caller learns the actual address (useful
//! with `127.0.0.1:0`), then serves until the cancellation token fires.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::service::Routes;
use tonic::transport::Server;

/// Bind a TCP listener for a gRPC server.
///
/// # Errors
///
/// Returns an error if `addr` is not a socket address or cannot be bound.
pub async fn bind_tcp(addr: &str) -> anyhow::Result<(TcpListener, SocketAddr)> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid listen address '{addr}'"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind gRPC listener at '{addr}'"))?;
    let bound_addr = listener.local_addr()?;
    Ok((listener, bound_addr))
}

/// Serve `routes` on `listener` until `cancel` is triggered.
///
/// In-flight requests are allowed to finish after cancellation.
///
/// # Errors
///
/// Returns an error if the server fails while accepting or serving connections.
pub async fn serve_tcp(
    listener: TcpListener,
    routes: Routes,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let bound_addr = listener.local_addr()?;
    tracing::info!(%bound_addr, transport = "tcp", "gRPC server listening");

    let incoming = TcpListenerStream::new(listener);
    Server::builder()
        .add_routes(routes)
        .serve_with_incoming_shutdown(incoming, async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!(%bound_addr, "gRPC server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_tcp_ephemeral_port() {
        let (_listener, addr) = bind_tcp("127.0.0.1:0").await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0, "ephemeral port should be assigned");
    }

    #[tokio::test]
    async fn test_bind_tcp_rejects_garbage() {
        let result = bind_tcp("not-an-address").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_serve_tcp_stops_on_cancel() {
        let (listener, _addr) = bind_tcp("127.0.0.1:0").await.unwrap();
        let cancel = CancellationToken::new();
        let server = tokio::spawn(serve_tcp(listener, Routes::default(), cancel.clone()));

        cancel.cancel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .expect("server should stop after cancel")
            .unwrap();
        assert!(result.is_ok());
    }
}
