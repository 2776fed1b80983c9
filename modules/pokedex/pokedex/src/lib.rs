//! Pokedex lookup service
//!
//! Answers "which species is called X" over gRPC from a fixed catalog.
//!
//! ## Architecture
//!
//! - `domain/catalog.rs` - Catalog loading and validation
//! - `domain/service.rs` - Case-insensitive name lookup
//! - `api/grpc/server.rs` - gRPC server implementation
//! - `config.rs` - Server configuration
//! - `module.rs` - Startup and serving
//!
//! Clients should use the `pokedex-sdk` crate, which carries the generated
//! stubs and the call controller.

// === MODULE DEFINITION ===
mod module;
pub use module::PokedexModule;

pub mod config;
pub use config::PokedexConfig;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
