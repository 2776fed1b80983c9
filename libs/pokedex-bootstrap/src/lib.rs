#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Bootstrap helpers shared by the pokedex binaries.
//!
//! - [`config`]: layered configuration (defaults, YAML, environment)
//! - [`logging`]: `tracing` subscriber setup
//! - [`signals`]: shutdown signal handling

pub mod config;
pub mod logging;
pub mod signals;

pub use config::{LogFormat, LoggingConfig, load_layered, to_yaml};
pub use logging::init_logging;
pub use signals::wait_for_shutdown;
