//! Protocol layer for hub communication.
//!
//! This module handles SSE framing and the JSON payloads served by a hub's
//! live log API.

pub mod message;
pub mod sse;

pub use message::{DriverInfo, LiveLogMessage, LogLevel};
pub use sse::{SseDecoder, SseEvent};
