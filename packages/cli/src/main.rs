// ABOUTME: Entry point for the edgecron command line interface
// ABOUTME: Parses arguments, sets up tracing, and dispatches to the command handlers

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::*;
use edgecron_settings::{FileStore, SettingsStore};

mod commands;

use commands::config::ConfigCommands;

#[derive(Parser)]
#[command(name = "edgecron")]
#[command(about = "Edgecron - trigger site cron from a Cloudflare Worker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a Cloudflare account with OAuth
    Connect,
    /// Remove the stored Cloudflare credential
    Disconnect,
    /// Check the OAuth configuration and endpoint reachability
    Probe,
    /// Deploy the cron Worker, its secrets, schedule, and route
    Setup,
    /// Trigger the cron endpoint once and report what happened
    Test,
    /// Show the configuration checklist and connection details
    Status,
    /// Inspect or change stored settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    match handle_command(cli.command).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let store: Arc<dyn SettingsStore> = Arc::new(FileStore::new()?);

    match command {
        Commands::Connect => commands::auth::connect(store).await,
        Commands::Disconnect => commands::auth::disconnect(store).await,
        Commands::Probe => commands::auth::probe(store).await,
        Commands::Setup => commands::setup::setup(store).await,
        Commands::Test => commands::setup::test(store).await,
        Commands::Status => commands::status::status(store).await,
        Commands::Config(config_cmd) => commands::config::handle_config(store, config_cmd).await,
    }
}

/// Logs stay quiet unless RUST_LOG asks for more
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();
}
