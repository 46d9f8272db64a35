//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use edge_core::protocol::LiveLogMessage;
use edge_core::storage::KnownHub;

/// Output formatter trait
pub trait OutputFormatter {
    /// Format the known hubs list
    fn format_known_hubs(&self, hubs: &[KnownHub]) -> String;

    /// Format the result of removing a known hub
    fn format_hub_removed(&self, authority: &str, removed: Option<&KnownHub>) -> String;

    /// Format one live log record as a single line
    fn format_log(&self, message: &LiveLogMessage) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
