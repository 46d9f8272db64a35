//! Core library for streaming live driver logs from edge hubs.
//!
//! - [`address`]: hub address parsing
//! - [`hub`]: REST client and certificate pinning
//! - [`storage`]: the known hubs trust store
//! - [`stream`]: the SSE log stream session
//! - [`selector`]: choosing which drivers to stream

pub mod address;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod selector;
pub mod storage;
pub mod stream;

pub use address::{parse_ip_and_port, Authority, DEFAULT_LIVE_LOG_PORT};
pub use error::{CoreError, HubError, Result, SelectError, StorageError, StreamError};
