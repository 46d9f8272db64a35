//! Payloads exchanged with a hub's live log API.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::sse::SseEvent;

/// A driver installed on a hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_id: String,
    pub driver_name: String,
}

/// Severity of a live log record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawLevel", into = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    /// Unleveled `print` output from a driver.
    #[default]
    Print,
    /// A level this client does not know about, shown verbatim.
    Other(String),
}

/// Hubs report levels as numeric codes or names.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Code(i64),
    Name(String),
}

impl From<RawLevel> for LogLevel {
    fn from(raw: RawLevel) -> Self {
        match raw {
            RawLevel::Code(code) => LogLevel::from_code(code),
            RawLevel::Name(name) => LogLevel::from_name(&name),
        }
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl LogLevel {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            5 => LogLevel::Fatal,
            100 => LogLevel::Print,
            other => LogLevel::Other(other.to_string()),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_uppercase().as_str() {
            "TRACE" => LogLevel::Trace,
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARN" | "WARNING" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            "FATAL" => LogLevel::Fatal,
            "PRINT" => LogLevel::Print,
            _ => LogLevel::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Print => "PRINT",
            LogLevel::Other(name) => name,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log record from a driver, carried as the data of one SSE event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveLogMessage {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub driver_id: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default, alias = "level")]
    pub log_level: LogLevel,
    pub message: String,
}

impl LiveLogMessage {
    pub fn from_event(event: &SseEvent) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&event.data)
    }
}
