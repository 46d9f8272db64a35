//! Error types for the edge core library.

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Hub(#[from] HubError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while talking to a hub's local API.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Hub verification failed for {authority}.")]
    VerificationFailed { authority: String },

    #[error("{cause}")]
    Unreachable { authority: String, cause: String },

    #[error("Unauthorized at {authority}")]
    Unauthorized { authority: String },

    #[error("Hub at {authority} rejected the request: HTTP {status}")]
    Rejected { authority: String, status: u16 },

    #[error("Invalid response from {authority}: {message}")]
    InvalidResponse { authority: String, message: String },
}

/// Terminal failures of a live log stream session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("Hub verification failed for {authority}.")]
    VerificationFailed { authority: String },

    #[error("Unauthorized at {authority}")]
    Unauthorized { authority: String },

    #[error("{0}")]
    Connection(String),

    #[error("Stream session has already been started")]
    AlreadyStarted,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access storage directory: {0}")]
    DirectoryAccess(String),

    #[error("Known hubs file {path} is unreadable: {message}")]
    TrustStoreCorrupt { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from resolving which driver(s) to stream.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("{0}")]
    InvalidReference(String),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
