//! Call outcomes and errors
//!
//! A lookup call always ends in exactly one [`CallOutcome`]. Failures are
//! split in two so a caller can tell "no connection" apart from everything
//! else; a miss is not a failure at all.

use std::num::ParseIntError;

use pokedex_transport_grpc::{ChannelError, error_chain};
use tonic::Code;

use crate::proto::LookupReply;

/// Error raised while performing one lookup call.
#[derive(thiserror::Error, Debug)]
pub enum CallError {
    #[error("invalid port '{input}'")]
    InvalidPort {
        input: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("lookup RPC failed")]
    Rpc(#[from] tonic::Status),
}

impl CallError {
    /// Whether the error comes from the network rather than from the input
    /// or the service.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::InvalidPort { .. } | Self::Channel(ChannelError::InvalidEndpoint { .. }) => false,
            Self::Channel(ChannelError::Connect { .. }) => true,
            Self::Rpc(status) => {
                matches!(
                    status.code(),
                    Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled
                ) || has_transport_source(status)
            }
        }
    }
}

/// Whether a status was produced locally from a broken connection.
///
/// tonic maps failures of an established connection (reset by the peer,
/// HTTP/2 connection errors) to `Unknown` and keeps the transport error as
/// the status source.
fn has_transport_source(status: &tonic::Status) -> bool {
    let mut source = std::error::Error::source(status);
    while let Some(cause) = source {
        if cause.downcast_ref::<tonic::transport::Error>().is_some()
            || cause.downcast_ref::<std::io::Error>().is_some()
        {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Parse the user-supplied port. An empty string means port `0`.
///
/// # Errors
///
/// Returns [`CallError::InvalidPort`] if the string is not a `u16`.
pub fn parse_port(input: &str) -> Result<u16, CallError> {
    if input.is_empty() {
        return Ok(0);
    }
    input.parse().map_err(|source| CallError::InvalidPort {
        input: input.to_owned(),
        source,
    })
}

/// Classified result of one lookup call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The service returned a record.
    Found { reply: LookupReply },
    /// The service answered with the empty reply.
    NotFound,
    /// The service could not be reached, or the connection failed mid-call.
    ConnectivityFailure { detail: String },
    /// Bad local input or an unexpected service error.
    OtherFailure { detail: String },
}

impl CallOutcome {
    /// Classify a reply. An empty `localized_name` means nothing matched.
    #[must_use]
    pub fn from_reply(reply: LookupReply) -> Self {
        if reply.localized_name.is_empty() {
            Self::NotFound
        } else {
            Self::Found { reply }
        }
    }

    /// Classify a failed call.
    #[must_use]
    pub fn from_error(err: &CallError) -> Self {
        let detail = error_chain(err);
        if err.is_connectivity() {
            Self::ConnectivityFailure { detail }
        } else {
            Self::OtherFailure { detail }
        }
    }

    /// Classify the result of a call.
    #[must_use]
    pub fn from_result(result: Result<LookupReply, CallError>) -> Self {
        match result {
            Ok(reply) => Self::from_reply(reply),
            Err(err) => Self::from_error(&err),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Found { .. } => "found",
            Self::NotFound => "not_found",
            Self::ConnectivityFailure { .. } => "connectivity_failure",
            Self::OtherFailure { .. } => "other_failure",
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectivityFailure { .. } | Self::OtherFailure { .. }
        )
    }
}
