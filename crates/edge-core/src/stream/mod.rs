//! Live log streaming.
//!
//! A [`StreamSession`] consumes events from an [`EventTransport`]; the HTTP
//! transport talks SSE to a hub.

pub mod session;
pub mod transport;

pub use session::{CloseReason, SessionEvent, SessionState, StreamSession};
pub use transport::{EventTransport, HttpTransport, TransportError, TransportEvent};
