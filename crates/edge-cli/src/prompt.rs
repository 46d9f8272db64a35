//! Terminal interaction: the progress spinner and operator prompts.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use colored::*;
use comfy_table::{Cell, ContentArrangement, Table};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use edge_core::address::{Authority, DEFAULT_LIVE_LOG_PORT};
use edge_core::hub::HostConfirmation;
use edge_core::protocol::DriverInfo;
use edge_core::selector::DriverPrompt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::error::CliError;

/// Spinner shown on stderr while waiting on the hub.
///
/// Clones share the same spinner so prompts raised from inside the TLS
/// handshake can hide it.
#[derive(Clone, Default)]
pub struct Activity {
    enabled: bool,
    bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl Activity {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bar: Arc::default(),
        }
    }

    /// Show the spinner with `message`, replacing any previous one.
    pub fn start(&self, message: impl Into<String>) {
        if !self.enabled {
            return;
        }

        let mut bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = bar.take() {
            previous.finish_and_clear();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.into());
        pb.enable_steady_tick(Duration::from_millis(100));
        *bar = Some(pb);
    }

    pub fn stop(&self) {
        let mut bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Run `f` with the spinner hidden.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        let bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        match bar.as_ref() {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }
}

/// Prompts on the controlling terminal with dialoguer.
pub struct TerminalPrompter {
    interactive: bool,
    activity: Activity,
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new(interactive: bool, activity: Activity) -> Self {
        Self {
            interactive,
            activity,
            theme: ColorfulTheme::default(),
        }
    }

    /// Ask for the hub address until it parses.
    pub fn ask_hub_address(&self) -> Result<Authority, CliError> {
        if !self.interactive {
            return Err(CliError::InvalidArgument(
                "--hub-address is required when not running interactively".to_string(),
            ));
        }

        let address: String = self.activity.suspend(|| {
            Input::<String>::with_theme(&self.theme)
                .with_prompt("Enter hub IP address with optionally appended port number")
                .validate_with(|input: &String| -> Result<(), String> {
                    Authority::resolve(input, DEFAULT_LIVE_LOG_PORT)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_error)
        })?;

        Ok(Authority::resolve(&address, DEFAULT_LIVE_LOG_PORT)?)
    }
}

impl HostConfirmation for TerminalPrompter {
    fn confirm(&self, authority: &str, fingerprint: &str) -> bool {
        self.activity.suspend(|| {
            eprintln!(
                "{} The authenticity of {} can't be established. Certificate fingerprint is {}",
                "Warning:".yellow().bold(),
                authority,
                fingerprint
            );

            if !self.interactive {
                warn!(%authority, "cannot confirm hub certificate without a terminal");
                return false;
            }

            Confirm::with_theme(&self.theme)
                .with_prompt("Are you sure you want to continue connecting?")
                .default(false)
                .interact()
                .unwrap_or_else(|e| {
                    warn!(error = %e, "certificate confirmation prompt failed");
                    false
                })
        })
    }

    fn added(&self, authority: &str) {
        self.activity.suspend(|| {
            eprintln!(
                "{} Permanently added {} to the list of known hubs.",
                "Warning:".yellow().bold(),
                authority
            );
        });
    }
}

impl DriverPrompt for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn show_drivers(&self, drivers: &[DriverInfo]) {
        self.activity.suspend(|| eprintln!("{}", driver_table(drivers)));
    }

    fn ask(&self, message: &str, default: &str) -> io::Result<String> {
        self.activity.suspend(|| {
            Input::<String>::with_theme(&self.theme)
                .with_prompt(message)
                .default(default.to_string())
                .interact_text()
                .map_err(prompt_error)
        })
    }

    fn reject(&self, message: &str) {
        self.activity
            .suspend(|| eprintln!("{} {}", "Warning:".yellow().bold(), message));
    }
}

/// Numbered driver list as shown before asking for an id or index.
pub fn driver_table(drivers: &[DriverInfo]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Driver Id", "Name"]);

    for (index, driver) in drivers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&driver.driver_id),
            Cell::new(&driver.driver_name),
        ]);
    }

    table
}

fn prompt_error(e: dialoguer::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}
