//! gRPC API layer

pub mod server;

pub use server::LookupServiceImpl;
