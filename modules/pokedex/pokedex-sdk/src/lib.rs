//! Pokedex SDK
//!
//! This crate provides everything needed to talk to the pokedex service:
//! - Proto stubs (`LookupRequest`, `LookupReply`, client and server traits)
//! - The call controller (`LookupCaller`) that runs one lookup per channel
//! - The classified result of a call (`CallOutcome`)
//!
//! ## Usage
//!
//! ```ignore
//! use pokedex_sdk::{CallOutcome, LookupCaller};
//! use pokedex_transport_grpc::GrpcClientConfig;
//!
//! let caller = LookupCaller::new(GrpcClientConfig::new(pokedex_sdk::SERVICE_NAME));
//! match caller.dispatch("10.0.2.2", "50052", " Pikachu ").outcome().await {
//!     CallOutcome::Found { reply } => println!("{}", reply.localized_name),
//!     CallOutcome::NotFound => println!("no result"),
//!     CallOutcome::ConnectivityFailure { .. } => println!("no connection"),
//!     CallOutcome::OtherFailure { detail } => println!("error: {detail}"),
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === OUTCOMES AND ERRORS ===
mod api;
pub use api::{CallError, CallOutcome, parse_port};

// === CALL CONTROLLER ===
mod client;
pub use client::{LookupCaller, PendingCall};

// === GRPC PROTO STUBS ===
/// Generated protobuf types for the `Lookup` service
pub mod proto {
    tonic::include_proto!("pokedex.v1");
}

pub use proto::lookup_client::LookupClient;
pub use proto::lookup_server::{Lookup, LookupServer};
pub use proto::{LookupReply, LookupRequest};

/// Encoded `FileDescriptorSet` of the pokedex protos, served over reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("pokedex_descriptor");

/// Fully-qualified gRPC service name.
pub const SERVICE_NAME: &str = "pokedex.v1.Lookup";

/// Port the server listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 50052;
