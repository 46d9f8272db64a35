//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::json;

use edge_core::protocol::LiveLogMessage;
use edge_core::storage::KnownHub;

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_known_hubs(&self, hubs: &[KnownHub]) -> String {
        Self::to_json(&json!({
            "hubs": hubs,
            "count": hubs.len()
        }))
    }

    fn format_hub_removed(&self, authority: &str, removed: Option<&KnownHub>) -> String {
        Self::to_json(&json!({
            "authority": authority,
            "removed": removed.is_some(),
            "fingerprint": removed.map(|hub| hub.fingerprint.as_str())
        }))
    }

    // One object per line so the stream can be piped.
    fn format_log(&self, message: &LiveLogMessage) -> String {
        serde_json::to_string(message).unwrap_or_else(|_| "{}".to_string())
    }
}
