//! Command-line client for the pokedex lookup service.
//!
//! Runs exactly one lookup per invocation. The call is dispatched to a
//! runtime worker while the main thread waits for the published outcome.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use pokedex_bootstrap::{LoggingConfig, init_logging};
use pokedex_sdk::{CallOutcome, LookupCaller, SERVICE_NAME};
use pokedex_transport_grpc::GrpcClientConfig;

/// Pokedex CLI - look up a species by its english name
#[derive(Parser)]
#[command(name = "pokedex-cli")]
#[command(about = "Pokedex CLI - look up a species by its english name")]
#[command(version)]
struct Cli {
    /// Server host name or IP address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port; an empty value dials port 0
    #[arg(short, long, default_value_t = pokedex_sdk::DEFAULT_PORT.to_string())]
    port: String,

    /// Time allowed to establish the connection
    #[arg(long, default_value_t = 10_000)]
    connect_timeout_ms: u64,

    /// Deadline for the lookup RPC itself (none by default)
    #[arg(long)]
    rpc_timeout_ms: Option<u64>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// English name to look up
    query: String,
}

impl Cli {
    fn client_config(&self) -> GrpcClientConfig {
        let cfg = GrpcClientConfig::new(SERVICE_NAME)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms));
        match self.rpc_timeout_ms {
            Some(ms) => cfg.with_rpc_timeout(Duration::from_millis(ms)),
            None => cfg,
        }
    }
}

/// Text shown to the user and the process exit code for an outcome.
fn render(outcome: &CallOutcome) -> (String, u8) {
    match outcome {
        CallOutcome::Found { reply } => (
            format!(
                "#{} {} ({})\n{}",
                reply.id, reply.localized_name, reply.category, reply.image_url
            ),
            0,
        ),
        CallOutcome::NotFound => ("no result".to_owned(), 0),
        CallOutcome::ConnectivityFailure { detail } => (format!("no connection: {detail}"), 2),
        CallOutcome::OtherFailure { detail } => (format!("error: {detail}"), 1),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: "warn".to_owned(),
        ..LoggingConfig::default()
    };
    init_logging(&logging, cli.verbose)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let caller = LookupCaller::new(cli.client_config());
    let outcome = caller
        .dispatch_on(runtime.handle(), cli.host, cli.port, cli.query)
        .blocking_outcome();
    tracing::debug!(outcome = outcome.kind(), "lookup finished");

    let (text, code) = render(&outcome);
    if outcome.is_failure() {
        eprintln!("{text}");
    } else {
        println!("{text}");
    }
    Ok(ExitCode::from(code))
}
