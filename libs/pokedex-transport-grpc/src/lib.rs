#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Plaintext gRPC transport for the pokedex service.
//!
//! - [`client`]: per-call plaintext channels with a bounded teardown wait
//! - [`server`]: TCP listener helpers for hosting tonic routes

pub mod client;
pub mod server;

pub use client::{ChannelError, GrpcClientConfig, PlaintextChannel, Teardown, open_plaintext};

/// Render an error and all of its sources as `outer: inner: root`.
///
/// tonic transport errors only print "transport error" at the top level, the
/// useful part (refused, timed out, dns) lives further down the chain.
#[must_use]
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !rendered.ends_with(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }
    rendered
}
