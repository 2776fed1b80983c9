//! gRPC client transport configuration and per-call channels.
//!
//! This module provides:
//! - Configurable connect timeout and optional per-RPC deadline
//! - Plaintext (`http://`) channels owned by exactly one call
//! - Teardown with a bounded grace period for the underlying connection
//! - A tracing span around connection establishment
//!
//! **Note:** channels are never pooled or reused and nothing here retries.
//! A connect failure is returned to the caller as-is.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tonic::transport::{Channel, Endpoint, Uri};
use tracing::Instrument;

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration for the client transport.
#[derive(Debug, Clone)]
#[must_use]
pub struct GrpcClientConfig {
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,

    /// Deadline applied to every RPC on the channel. `None` means no deadline.
    pub rpc_timeout: Option<Duration>,

    /// How long [`PlaintextChannel::close`] waits for the connection to wind down.
    pub teardown_grace: Duration,

    /// Service name for tracing.
    pub service_name: &'static str,

    /// Emit an info event for every established channel.
    pub enable_tracing: bool,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: None,
            teardown_grace: Duration::from_secs(1),
            service_name: "grpc_client",
            enable_tracing: true,
        }
    }
}

impl GrpcClientConfig {
    /// Create a new configuration with the given service name.
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set a deadline for every RPC issued on the channel.
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = Some(timeout);
        self
    }

    /// Set the teardown grace period.
    pub fn with_teardown_grace(mut self, grace: Duration) -> Self {
        self.teardown_grace = grace;
        self
    }

    /// Disable the per-channel info event.
    pub fn without_tracing(mut self) -> Self {
        self.enable_tracing = false;
        self
    }
}

/// Failure to obtain a channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The address cannot form a valid endpoint. Nothing was dialed.
    #[error("invalid endpoint `{uri}`: {reason}")]
    InvalidEndpoint { uri: String, reason: String },

    /// The endpoint is valid but the connection could not be established.
    #[error("failed to connect to `{uri}`")]
    Connect {
        uri: String,
        #[source]
        source: tonic::transport::Error,
    },
}

/// How a [`PlaintextChannel::close`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// Every connection of the channel was released within the grace period.
    Completed,
    /// The grace period elapsed first; the connection is left to drop on its own.
    TimedOut,
}

/// Build the plaintext URI for `host:port`, bracketing bare IPv6 hosts.
#[must_use]
pub fn plaintext_uri(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("http://[{host}]:{port}")
    } else {
        format!("http://{host}:{port}")
    }
}

/// Build a tonic `Endpoint` with the configured timeouts.
fn build_endpoint(uri: &str, cfg: &GrpcClientConfig) -> Result<Endpoint, ChannelError> {
    let invalid = |reason: String| ChannelError::InvalidEndpoint {
        uri: uri.to_owned(),
        reason,
    };

    let mut endpoint = Endpoint::from_shared(uri.to_owned())
        .map_err(|e| invalid(crate::error_chain(&e)))?
        .connect_timeout(cfg.connect_timeout)
        .tcp_nodelay(true);

    if endpoint.uri().host().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_owned()));
    }

    if let Some(timeout) = cfg.rpc_timeout {
        endpoint = endpoint.timeout(timeout);
    }

    Ok(endpoint)
}

/// Dial the TCP peer named by `uri`.
async fn dial(uri: &Uri, connect_timeout: Duration) -> io::Result<TcpStream> {
    let host = uri
        .host()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "endpoint has no host"))?;
    let port = uri.port_u16().unwrap_or(80);

    match tokio::time::timeout(connect_timeout, TcpStream::connect((host, port))).await {
        Ok(stream) => stream,
        Err(_elapsed) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connect to {host}:{port} timed out"),
        )),
    }
}

/// TCP stream that keeps its channel's connection tracker open while alive.
struct TrackedStream {
    inner: TcpStream,
    _connection: TaskTrackerToken,
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for TrackedStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// A plaintext channel owned by a single call.
///
/// Clients built from [`PlaintextChannel::channel`] must be dropped before
/// [`PlaintextChannel::close`] is awaited, otherwise the connection stays
/// open and the close waits out the whole grace period.
#[derive(Debug)]
pub struct PlaintextChannel {
    channel: Channel,
    connections: TaskTracker,
    grace: Duration,
    uri: String,
}

impl PlaintextChannel {
    /// A handle to the underlying tonic channel, for building generated clients.
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// The URI this channel is bound to.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Release the channel and wait up to the grace period for its
    /// connection to finish shutting down.
    ///
    /// Never fails: an elapsed grace period is reported as [`Teardown::TimedOut`].
    pub async fn close(self) -> Teardown {
        let Self {
            channel,
            connections,
            grace,
            uri,
        } = self;

        drop(channel);
        connections.close();

        if tokio::time::timeout(grace, connections.wait()).await.is_ok() {
            tracing::debug!(%uri, "gRPC channel closed");
            Teardown::Completed
        } else {
            tracing::debug!(
                %uri,
                grace_ms = duration_to_u64_ms(grace),
                "gRPC channel teardown grace period elapsed"
            );
            Teardown::TimedOut
        }
    }
}

/// Open a new, unpooled plaintext channel to `host:port`.
///
/// The connection is established eagerly, so an unreachable peer is reported
/// here as [`ChannelError::Connect`] rather than on the first RPC.
///
/// # Errors
///
/// - [`ChannelError::InvalidEndpoint`] if `host`/`port` cannot form a valid URI
/// - [`ChannelError::Connect`] if the peer cannot be reached within the connect timeout
pub async fn open_plaintext(
    host: &str,
    port: u16,
    cfg: &GrpcClientConfig,
) -> Result<PlaintextChannel, ChannelError> {
    let uri = plaintext_uri(host, port);
    let span = tracing::debug_span!(
        "grpc_connect",
        service = cfg.service_name,
        uri = %uri
    );

    async move {
        let endpoint = build_endpoint(&uri, cfg)?;

        let connections = TaskTracker::new();
        let tracker = connections.clone();
        let connect_timeout = cfg.connect_timeout;
        let connector = tower::service_fn(move |target: Uri| {
            let token = tracker.token();
            async move {
                let inner = dial(&target, connect_timeout).await?;
                Ok::<_, io::Error>(TokioIo::new(TrackedStream {
                    inner,
                    _connection: token,
                }))
            }
        });

        let channel = endpoint
            .connect_with_connector(connector)
            .await
            .map_err(|source| ChannelError::Connect {
                uri: uri.clone(),
                source,
            })?;

        if cfg.enable_tracing {
            tracing::info!(
                service_name = cfg.service_name,
                connect_timeout_ms = duration_to_u64_ms(cfg.connect_timeout),
                rpc_timeout_ms = cfg.rpc_timeout.map(duration_to_u64_ms),
                "gRPC client connected"
            );
        }

        Ok(PlaintextChannel {
            channel,
            connections,
            grace: cfg.teardown_grace,
            uri,
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = GrpcClientConfig::default();
        assert_eq!(cfg.connect_timeout, Duration::from_secs(10));
        assert_eq!(cfg.rpc_timeout, None);
        assert_eq!(cfg.teardown_grace, Duration::from_secs(1));
        assert!(cfg.enable_tracing);
    }

    #[test]
    fn test_config_builder() {
        let cfg = GrpcClientConfig::new("test_service")
            .with_connect_timeout(Duration::from_secs(5))
            .with_rpc_timeout(Duration::from_secs(15))
            .with_teardown_grace(Duration::from_millis(250))
            .without_tracing();

        assert_eq!(cfg.service_name, "test_service");
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
        assert_eq!(cfg.rpc_timeout, Some(Duration::from_secs(15)));
        assert_eq!(cfg.teardown_grace, Duration::from_millis(250));
        assert!(!cfg.enable_tracing);
    }

    #[test]
    fn test_plaintext_uri() {
        assert_eq!(plaintext_uri("localhost", 50052), "http://localhost:50052");
        assert_eq!(plaintext_uri("10.0.2.2", 0), "http://10.0.2.2:0");
        assert_eq!(plaintext_uri("::1", 80), "http://[::1]:80");
        assert_eq!(plaintext_uri("[::1]", 80), "http://[::1]:80");
    }

    #[test]
    fn test_build_endpoint_succeeds() {
        let cfg = GrpcClientConfig::default();
        let result = build_endpoint("http://localhost:50052", &cfg);
        assert!(result.is_ok(), "build_endpoint should succeed with valid URI");
    }

    #[test]
    fn test_build_endpoint_rejects_bad_host() {
        let cfg = GrpcClientConfig::default();
        let result = build_endpoint(&plaintext_uri("not a host", 50052), &cfg);
        assert!(matches!(result, Err(ChannelError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_build_endpoint_rejects_empty_host() {
        let cfg = GrpcClientConfig::default();
        let result = build_endpoint(&plaintext_uri("", 50052), &cfg);
        assert!(matches!(result, Err(ChannelError::InvalidEndpoint { .. })));
    }
}
