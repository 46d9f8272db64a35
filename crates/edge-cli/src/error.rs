//! Error types for the edge CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use edge_core::error::CoreError;
use thiserror::Error;

// Re-export core error types so command modules can use them via crate::error
pub use edge_core::error::{HubError, SelectError, StorageError, StreamError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const HUB_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::InvalidAddress(_) => exit_codes::INVALID_ARGS,
                CoreError::Hub(HubError::Unreachable { .. }) => exit_codes::NETWORK_ERROR,
                CoreError::Hub(_) => exit_codes::HUB_ERROR,
                CoreError::Stream(StreamError::Connection(_)) => exit_codes::NETWORK_ERROR,
                CoreError::Stream(StreamError::AlreadyStarted) => exit_codes::GENERAL_ERROR,
                CoreError::Stream(_) => exit_codes::HUB_ERROR,
                CoreError::Storage(_) => exit_codes::GENERAL_ERROR,
                CoreError::Other(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::Other(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

// Conversions from core error subtypes to CliError
impl From<HubError> for CliError {
    fn from(e: HubError) -> Self {
        CliError::Core(CoreError::Hub(e))
    }
}

impl From<StreamError> for CliError {
    fn from(e: StreamError) -> Self {
        CliError::Core(CoreError::Stream(e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Core(CoreError::Storage(e))
    }
}

impl From<SelectError> for CliError {
    fn from(e: SelectError) -> Self {
        match e {
            SelectError::InvalidReference(message) => CliError::InvalidArgument(message),
            SelectError::Prompt(e) => CliError::Io(e),
            SelectError::Core(e) => CliError::Core(e),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
