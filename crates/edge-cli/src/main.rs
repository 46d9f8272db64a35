//! Edge CLI - stream live driver logs from edge hubs.
//!
//! Connects to a hub's local live log endpoint, pins its certificate on first
//! use and prints driver logs until interrupted.

mod cli;
mod commands;
mod config;
mod error;
mod output;
mod prompt;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, DriversCommands};
use config::Settings;
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "edge_core=debug,edge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::from_cli(&cli)?;

    match cli.command {
        Commands::Drivers(args) => match args.command {
            DriversCommands::Logcat(args) => commands::run_logcat(args, &settings).await,
        },
        Commands::KnownHubs(args) => commands::run_known_hubs(args, &settings).await,
    }
}
