//! Live log stream session.
//!
//! A session drives one transport through
//! `Idle → Connecting → Open → Closed`. It is the only reader of the
//! transport's event channel, so events are handled strictly one at a time
//! and in delivery order.

use reqwest::Url;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::transport::{EventTransport, TransportError, TransportEvent};
use crate::error::StreamError;
use crate::hub::connection::describe_connection_error;
use crate::protocol::LiveLogMessage;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Cancelled by the operator.
    Normal,
    Error(StreamError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closed(CloseReason),
}

/// What the caller receives from [`StreamSession::next_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The hub accepted the stream.
    Opened,
    Message(LiveLogMessage),
}

enum Step {
    Cancelled,
    Received(Option<TransportEvent>),
}

pub struct StreamSession<T: EventTransport> {
    authority: String,
    transport: T,
    state: SessionState,
    events: Option<mpsc::Receiver<TransportEvent>>,
}

impl<T: EventTransport> StreamSession<T> {
    pub fn new(authority: impl Into<String>, transport: T) -> Self {
        Self {
            authority: authority.into(),
            transport,
            state: SessionState::Idle,
            events: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open the transport for `url`. Only valid from `Idle`.
    pub fn init_source(&mut self, url: Url) -> Result<(), StreamError> {
        if self.state != SessionState::Idle {
            return Err(StreamError::AlreadyStarted);
        }

        debug!(%url, "opening log stream");
        self.events = Some(self.transport.open(url));
        self.state = SessionState::Connecting;
        Ok(())
    }

    /// Wait for the next event.
    ///
    /// Returns `Ok(None)` once the session is closed, including after
    /// `cancel` fires. Errors close the session and release the transport
    /// before they are returned.
    pub async fn next_event(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<SessionEvent>, StreamError> {
        loop {
            if !matches!(self.state, SessionState::Connecting | SessionState::Open) {
                return Ok(None);
            }

            let step = match self.events.as_mut() {
                Some(events) => tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Step::Cancelled,
                    event = events.recv() => Step::Received(event),
                },
                None => return Ok(None),
            };

            match step {
                Step::Cancelled => {
                    self.finish(CloseReason::Normal);
                    return Ok(None);
                }
                Step::Received(None) => {
                    return Err(self.fail(StreamError::Connection(format!(
                        "Stream closed by hub at {}",
                        self.authority
                    ))));
                }
                Step::Received(Some(TransportEvent::Open)) => {
                    if self.state == SessionState::Connecting {
                        self.state = SessionState::Open;
                        return Ok(Some(SessionEvent::Opened));
                    }
                }
                Step::Received(Some(TransportEvent::Event(event))) => {
                    if self.state != SessionState::Open || !event.is_message() {
                        debug!(event = ?event.event, "ignoring event");
                        continue;
                    }
                    match LiveLogMessage::from_event(&event) {
                        Ok(message) => return Ok(Some(SessionEvent::Message(message))),
                        Err(e) => warn!(error = %e, data = %event.data, "skipping malformed log event"),
                    }
                }
                Step::Received(Some(TransportEvent::Error(error))) => {
                    let error = self.classify(error);
                    return Err(self.fail(error));
                }
            }
        }
    }

    /// Close the session normally.
    pub fn close(&mut self) {
        if !matches!(self.state, SessionState::Closed(_)) {
            self.finish(CloseReason::Normal);
        }
    }

    fn classify(&self, error: TransportError) -> StreamError {
        let authority = self.authority.clone();

        match error {
            TransportError::Status(401 | 403) => StreamError::Unauthorized { authority },
            TransportError::Status(status) => StreamError::Connection(format!(
                "Hub at {} responded with HTTP {}",
                authority, status
            )),
            TransportError::VerificationDeclined => StreamError::VerificationFailed { authority },
            TransportError::Connection(e) => {
                let error: &(dyn std::error::Error + 'static) = e.as_ref();
                StreamError::Connection(describe_connection_error(&authority, error))
            }
            TransportError::Closed => {
                StreamError::Connection(format!("Stream closed by hub at {}", authority))
            }
        }
    }

    fn fail(&mut self, error: StreamError) -> StreamError {
        debug!(error = %error, "log stream failed");
        self.finish(CloseReason::Error(error.clone()));
        error
    }

    fn finish(&mut self, reason: CloseReason) {
        self.transport.release();
        self.events = None;
        self.state = SessionState::Closed(reason);
    }
}

impl<T: EventTransport> Drop for StreamSession<T> {
    fn drop(&mut self) {
        if !matches!(self.state, SessionState::Closed(_)) {
            self.transport.release();
        }
    }
}
