//! Local storage for hub trust decisions.

pub mod known_hubs;

pub use known_hubs::{KnownHub, TrustStore, KNOWN_HUBS_FILE};

/// Get the default cache directory for the edge CLI.
///
/// Uses the `directories` crate to find the appropriate platform-specific
/// cache directory.
pub fn default_cache_dir() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("", "edge", "edge-cli").map(|dirs| dirs.cache_dir().to_path_buf())
}
