//! `tracing` subscriber initialization.
//!
//! Filter precedence: `RUST_LOG`, then the `-v` count, then the configured
//! level. Events go to stderr so stdout stays free for program output.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Filter directive for a verbosity count (-v info, -vv debug, -vvv trace).
#[must_use]
pub fn effective_level(cfg: &LoggingConfig, verbose: u8) -> String {
    match verbose {
        0 => cfg.level.clone(),
        1 => "info".to_owned(),
        2 => "debug".to_owned(),
        _ => "trace".to_owned(),
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the level is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig, verbose: u8) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(effective_level(cfg, verbose))
            .with_context(|| format!("invalid log level '{}'", cfg.level))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match cfg.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("failed to install tracing subscriber")
}
