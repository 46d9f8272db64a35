//! Table-formatted output for CLI.

use colored::*;
use comfy_table::{Cell, ContentArrangement, Table};

use edge_core::protocol::{LiveLogMessage, LogLevel};
use edge_core::storage::KnownHub;

use super::OutputFormatter;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn level_colored(level: &LogLevel) -> ColoredString {
        let level_str = format!("{:>5}", level.as_str());
        match level {
            LogLevel::Fatal => level_str.red().bold(),
            LogLevel::Error => level_str.red(),
            LogLevel::Warn => level_str.yellow(),
            LogLevel::Info => level_str.green(),
            LogLevel::Debug => level_str.blue(),
            LogLevel::Trace => level_str.dimmed(),
            LogLevel::Print | LogLevel::Other(_) => level_str.normal(),
        }
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_known_hubs(&self, hubs: &[KnownHub]) -> String {
        if hubs.is_empty() {
            return "No known hubs.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Hub", "Certificate Fingerprint"]);

        for hub in hubs {
            table.add_row(vec![Cell::new(&hub.hostname), Cell::new(&hub.fingerprint)]);
        }

        format!("{}\n\n{} known hub(s)", table, hubs.len())
    }

    fn format_hub_removed(&self, authority: &str, removed: Option<&KnownHub>) -> String {
        match removed {
            Some(_) => format!("{} Removed {} from the list of known hubs.", "[OK]".green(), authority),
            None => format!("{} {} is not a known hub.", "[!]".yellow(), authority),
        }
    }

    fn format_log(&self, message: &LiveLogMessage) -> String {
        let source = if message.driver_name.is_empty() {
            &message.driver_id
        } else {
            &message.driver_name
        };

        let mut line = String::new();
        if !message.timestamp.is_empty() {
            line.push_str(&format!("{} ", message.timestamp.dimmed()));
        }
        line.push_str(&format!(
            "{} {} {}",
            Self::level_colored(&message.log_level),
            format!("[{}]", source).cyan(),
            message.message
        ));
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(level: LogLevel) -> LiveLogMessage {
        LiveLogMessage {
            timestamp: "2024-05-01T10:00:00Z".to_string(),
            driver_id: "d1".to_string(),
            driver_name: "Zigbee Switch".to_string(),
            log_level: level,
            message: "device joined".to_string(),
        }
    }

    #[test]
    fn test_log_line_fields() {
        colored::control::set_override(false);
        let line = TableOutput::new().format_log(&message(LogLevel::Info));
        assert_eq!(line, "2024-05-01T10:00:00Z  INFO [Zigbee Switch] device joined");
    }

    #[test]
    fn test_log_line_falls_back_to_driver_id() {
        colored::control::set_override(false);
        let mut msg = message(LogLevel::Other("NOTICE".to_string()));
        msg.driver_name.clear();
        msg.timestamp.clear();

        let line = TableOutput::new().format_log(&msg);
        assert_eq!(line, "NOTICE [d1] device joined");
    }

    #[test]
    fn test_empty_known_hubs() {
        assert_eq!(TableOutput::new().format_known_hubs(&[]), "No known hubs.");
    }

    #[test]
    fn test_known_hubs_table_lists_fingerprints() {
        let hubs = vec![KnownHub {
            hostname: "10.0.0.5:9495".to_string(),
            fingerprint: "AA:BB:CC".to_string(),
        }];
        let rendered = TableOutput::new().format_known_hubs(&hubs);
        assert!(rendered.contains("10.0.0.5:9495"));
        assert!(rendered.contains("AA:BB:CC"));
        assert!(rendered.ends_with("1 known hub(s)"));
    }
}
