//! Pokedex lookup server binary.
//!
//! Configuration is layered: defaults, then `--config FILE` (YAML), then
//! `POKEDEX__*` environment variables, then CLI overrides.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use pokedex::config::ENV_PREFIX;
use pokedex::{PokedexConfig, PokedexModule};
use pokedex_bootstrap::{init_logging, load_layered, to_yaml, wait_for_shutdown};

/// Pokedex Server - species lookup over gRPC
#[derive(Parser)]
#[command(name = "pokedex-server")]
#[command(about = "Pokedex Server - species lookup over gRPC")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address override (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and catalog, then exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config: PokedexConfig = load_layered(cli.config.as_deref(), ENV_PREFIX)?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    init_logging(&config.logging, cli.verbose)?;

    if cli.print_config {
        println!("Effective configuration:\n{}", to_yaml(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

fn check_config(config: PokedexConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let module = PokedexModule::init(config)?;
    println!("Configuration is valid");
    println!("Catalog: {} records", module.service().catalog().len());
    Ok(())
}

async fn run_server(config: PokedexConfig) -> Result<()> {
    tracing::info!("Pokedex Server starting");

    let module = PokedexModule::init(config)?;
    let (listener, _addr) = module.bind().await?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(()) => tracing::info!("Shutting down pokedex server"),
            Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signals"),
        }
        trigger.cancel();
    });

    module.serve(listener, cancel).await
}
