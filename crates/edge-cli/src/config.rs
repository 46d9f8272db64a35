//! Runtime settings resolved from arguments and environment.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use edge_core::hub::{Anonymous, Authenticator, BearerToken};
use edge_core::storage::default_cache_dir;

use crate::cli::Cli;
use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct Settings {
    pub token: Option<String>,
    pub timeout: Duration,
    pub cache_dir: PathBuf,
    pub json: bool,
    /// Whether the operator can answer prompts.
    pub interactive: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.timeout == 0 {
            return Err(CliError::InvalidArgument(
                "--timeout must be greater than zero".to_string(),
            ));
        }

        let cache_dir = match &cli.cache_dir {
            Some(dir) => dir.clone(),
            None => default_cache_dir().ok_or_else(|| {
                CliError::Other("Could not determine a cache directory; use --cache-dir".to_string())
            })?,
        };

        Ok(Self {
            token: cli.token.clone().filter(|t| !t.is_empty()),
            timeout: Duration::from_millis(cli.timeout),
            cache_dir,
            json: cli.json,
            interactive: std::io::stdin().is_terminal() && std::io::stderr().is_terminal(),
        })
    }

    pub fn authenticator(&self) -> Arc<dyn Authenticator> {
        match &self.token {
            Some(token) => Arc::new(BearerToken::new(token.clone())),
            None => Arc::new(Anonymous),
        }
    }
}
