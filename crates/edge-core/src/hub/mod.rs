//! Hub communication layer.
//!
//! Provides the live log REST client, certificate pinning and connection
//! error classification.

pub mod client;
pub mod connection;
pub mod verifier;

pub use client::{Anonymous, Authenticator, BearerToken, LiveLogClient, DEFAULT_REQUEST_TIMEOUT};
pub use connection::{classify_connection_error, describe_connection_error};
pub use verifier::{fingerprint, HostConfirmation, HubVerifier, Verdict};
