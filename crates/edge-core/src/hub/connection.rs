//! Human-readable causes for connection failures.

use std::error::Error;
use std::io::{self, ErrorKind};

const GENERAL_MESSAGE: &str = "Ensure hub address is correct and try again";

/// Map a known network failure to a readable cause naming `authority`.
///
/// Returns `None` for errors that do not match a known pattern.
pub fn classify_connection_error(
    authority: &str,
    error: &(dyn Error + 'static),
) -> Option<String> {
    let mut current: Option<&(dyn Error + 'static)> = Some(error);

    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if let Some(cause) = classify_kind(authority, io_err.kind()) {
                return Some(cause);
            }
        }
        if let Some(cause) = classify_message(authority, &err.to_string()) {
            return Some(cause);
        }
        current = err.source();
    }

    None
}

fn classify_kind(authority: &str, kind: ErrorKind) -> Option<String> {
    match kind {
        ErrorKind::ConnectionRefused
        | ErrorKind::HostUnreachable
        | ErrorKind::NetworkUnreachable => Some(unable_to_connect(authority)),
        ErrorKind::TimedOut => Some(timed_out(authority)),
        _ => None,
    }
}

/// Classify by message text, for errors that only carry a description.
pub fn classify_message(authority: &str, message: &str) -> Option<String> {
    let lower = message.to_lowercase();

    if lower.contains("connection refused")
        || lower.contains("econnrefused")
        || lower.contains("no route to host")
        || lower.contains("host unreachable")
        || lower.contains("network is unreachable")
    {
        Some(unable_to_connect(authority))
    } else if lower.contains("timed out") || lower.contains("etimedout") {
        Some(timed_out(authority))
    } else if lower.contains("host is down") || lower.contains("ehostdown") {
        Some(format!("The host at {} is down. {}", authority, GENERAL_MESSAGE))
    } else {
        None
    }
}

/// Classified cause, or the full error chain when nothing matched.
pub fn describe_connection_error(authority: &str, error: &(dyn Error + 'static)) -> String {
    classify_connection_error(authority, error).unwrap_or_else(|| error_chain(error))
}

/// Join an error and its sources with `": "`.
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut current = error.source();

    while let Some(err) = current {
        let text = err.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = err.source();
    }

    message
}

fn unable_to_connect(authority: &str) -> String {
    format!("Unable to connect to {}. {}", authority, GENERAL_MESSAGE)
}

fn timed_out(authority: &str) -> String {
    format!("Connection to {} timed out. {}", authority, GENERAL_MESSAGE)
}
