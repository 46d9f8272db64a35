//! Known hubs management commands.

use edge_core::address::{Authority, DEFAULT_LIVE_LOG_PORT};
use edge_core::storage::{KnownHub, TrustStore};

use crate::cli::{KnownHubsArgs, KnownHubsCommands};
use crate::config::Settings;
use crate::error::Result;
use crate::output::{get_formatter, OutputFormatter};

/// Run the known-hubs command
pub async fn run_known_hubs(args: KnownHubsArgs, settings: &Settings) -> Result<()> {
    let formatter = get_formatter(settings.json);
    let mut store = TrustStore::open_in(&settings.cache_dir)?;

    let output = match args.command {
        KnownHubsCommands::List => list(&store, formatter.as_ref()),
        KnownHubsCommands::Remove(args) => remove(&mut store, &args.authority, formatter.as_ref())?,
    };

    println!("{}", output);
    Ok(())
}

fn list(store: &TrustStore, formatter: &dyn OutputFormatter) -> String {
    let hubs: Vec<KnownHub> = store.iter().cloned().collect();
    formatter.format_known_hubs(&hubs)
}

fn remove(
    store: &mut TrustStore,
    authority: &str,
    formatter: &dyn OutputFormatter,
) -> Result<String> {
    // Accept the same address forms as --hub-address so "10.0.0.5" finds
    // "10.0.0.5:9495".
    let key = Authority::resolve(authority, DEFAULT_LIVE_LOG_PORT)?.to_string();
    let removed = store.remove(&key)?;
    Ok(formatter.format_hub_removed(&key, removed.as_ref()))
}
