//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Edge CLI - stream live driver logs from edge hubs
#[derive(Parser, Debug)]
#[command(name = "edge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Bearer token used to authenticate with the hub
    #[arg(long, global = true, env = "EDGE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in milliseconds (does not apply to the log stream)
    #[arg(long, global = true, default_value = "30000", env = "EDGE_TIMEOUT")]
    pub timeout: u64,

    /// Directory holding the known hubs file
    #[arg(long, global = true, env = "EDGE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Driver commands
    Drivers(DriversArgs),

    /// Manage hubs whose certificates have been accepted
    KnownHubs(KnownHubsArgs),
}

// ==================== Drivers ====================

#[derive(Args, Debug)]
pub struct DriversArgs {
    #[command(subcommand)]
    pub command: DriversCommands,
}

#[derive(Subcommand, Debug)]
pub enum DriversCommands {
    /// Stream logs from installed drivers
    Logcat(LogcatArgs),
}

#[derive(Args, Debug)]
pub struct LogcatArgs {
    /// A specific driver to stream logs from (id or list index)
    pub driver_id: Option<String>,

    /// Stream from all installed drivers
    #[arg(short, long, conflicts_with = "driver_id")]
    pub all: bool,

    /// IPv4 address of hub with optionally appended port number
    #[arg(long)]
    pub hub_address: Option<String>,

    /// Output as newline-delimited JSON (NDJSON)
    #[arg(long)]
    pub ndjson: bool,
}

// ==================== Known hubs ====================

#[derive(Args, Debug)]
pub struct KnownHubsArgs {
    #[command(subcommand)]
    pub command: KnownHubsCommands,
}

#[derive(Subcommand, Debug)]
pub enum KnownHubsCommands {
    /// List known hubs and their certificate fingerprints
    List,

    /// Forget a hub so its certificate is confirmed again on next connect
    Remove(KnownHubsRemoveArgs),
}

#[derive(Args, Debug)]
pub struct KnownHubsRemoveArgs {
    /// Hub authority as ip:port
    pub authority: String,
}
