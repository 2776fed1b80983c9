//! Lookup call controller
//!
//! One call = one channel: parse the port, open a plaintext channel, issue
//! the unary lookup, classify, close the channel (bounded), publish.
//! Nothing is pooled, cached or retried.

use pokedex_transport_grpc::{GrpcClientConfig, PlaintextChannel, open_plaintext};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tonic::{Response, Status};
use tracing::Instrument;

use crate::api::{CallError, CallOutcome, parse_port};
use crate::proto::lookup_client::LookupClient;
use crate::proto::{LookupReply, LookupRequest};

/// Runs lookup calls against a pokedex server.
///
/// Holds only configuration; every call builds and tears down its own channel,
/// so a single caller can be shared freely between concurrent calls.
#[derive(Debug, Clone)]
pub struct LookupCaller {
    cfg: GrpcClientConfig,
}

impl Default for LookupCaller {
    fn default() -> Self {
        Self::new(GrpcClientConfig::new(crate::SERVICE_NAME))
    }
}

impl LookupCaller {
    #[must_use]
    pub fn new(cfg: GrpcClientConfig) -> Self {
        Self { cfg }
    }

    #[must_use]
    pub fn config(&self) -> &GrpcClientConfig {
        &self.cfg
    }

    /// Perform one lookup and classify the result.
    ///
    /// `port` may be empty, which dials port `0`. `query` is trimmed before
    /// it is sent. The channel is closed before this returns, whatever the
    /// outcome.
    pub async fn call(&self, host: &str, port: &str, query: &str) -> CallOutcome {
        let span = tracing::info_span!("pokedex_call", host = %host, port = %port);

        async move {
            let result = match parse_port(port) {
                Ok(port) => self.lookup(host, port, query.trim()).await,
                Err(err) => Err(err),
            };

            let outcome = CallOutcome::from_result(result);
            match &outcome {
                CallOutcome::ConnectivityFailure { detail } | CallOutcome::OtherFailure { detail } => {
                    tracing::warn!(outcome = outcome.kind(), %detail, "lookup call failed");
                }
                CallOutcome::Found { .. } | CallOutcome::NotFound => {
                    tracing::debug!(outcome = outcome.kind(), "lookup call completed");
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn lookup(&self, host: &str, port: u16, query: &str) -> Result<LookupReply, CallError> {
        let channel = open_plaintext(host, port, &self.cfg).await?;

        let result = {
            let mut client = LookupClient::new(channel.channel());
            let request = LookupRequest {
                query_name: query.to_owned(),
            };
            client.get_pokemon(request).await
        };

        settle(channel, result).await
    }

    /// Run a call on a worker task of the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime; use
    /// [`LookupCaller::dispatch_on`] from other threads.
    pub fn dispatch(
        &self,
        host: impl Into<String>,
        port: impl Into<String>,
        query: impl Into<String>,
    ) -> PendingCall {
        self.dispatch_on(&Handle::current(), host, port, query)
    }

    /// Run a call on a worker task of `runtime`.
    ///
    /// The outcome is delivered exactly once through the returned
    /// [`PendingCall`], after the channel teardown has been attempted.
    pub fn dispatch_on(
        &self,
        runtime: &Handle,
        host: impl Into<String>,
        port: impl Into<String>,
        query: impl Into<String>,
    ) -> PendingCall {
        let (tx, rx) = oneshot::channel();
        let caller = self.clone();
        let (host, port, query) = (host.into(), port.into(), query.into());

        runtime.spawn(async move {
            let outcome = caller.call(&host, &port, &query).await;
            if tx.send(outcome).is_err() {
                tracing::debug!("pending call dropped before its outcome was published");
            }
        });

        PendingCall { rx }
    }
}

/// The single-write slot a dispatched call publishes its outcome into.
#[derive(Debug)]
#[must_use = "a pending call does nothing unless its outcome is awaited"]
pub struct PendingCall {
    rx: oneshot::Receiver<CallOutcome>,
}

impl PendingCall {
    /// Wait for the outcome from async code.
    pub async fn outcome(self) -> CallOutcome {
        self.rx.await.unwrap_or_else(|_| worker_lost())
    }

    /// Wait for the outcome from a thread that is not driving a runtime.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn blocking_outcome(self) -> CallOutcome {
        self.rx.blocking_recv().unwrap_or_else(|_| worker_lost())
    }
}

/// Close the call's channel, then release the RPC result.
async fn settle(
    channel: PlaintextChannel,
    result: Result<Response<LookupReply>, Status>,
) -> Result<LookupReply, CallError> {
    // Teardown outcome is informational only.
    channel.close().await;
    Ok(result?.into_inner())
}

fn worker_lost() -> CallOutcome {
    CallOutcome::OtherFailure {
        detail: "lookup worker stopped before publishing an outcome".to_owned(),
    }
}
