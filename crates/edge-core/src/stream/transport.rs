//! SSE transports feeding a stream session.

use std::error::Error;
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, RequestBuilder, Url};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::hub::{Authenticator, HubVerifier};
use crate::protocol::{SseDecoder, SseEvent};

/// Capacity of the transport → session event channel.
const EVENT_BUFFER: usize = 64;

/// Something that happened on the underlying connection.
#[derive(Debug)]
pub enum TransportEvent {
    /// The hub accepted the stream request.
    Open,
    Event(SseEvent),
    Error(TransportError),
}

/// Why the underlying connection failed.
#[derive(Debug)]
pub enum TransportError {
    /// The hub answered with a non-success HTTP status.
    Status(u16),
    /// The operator refused the hub's certificate during the handshake.
    VerificationDeclined,
    /// The connection could not be established or broke.
    Connection(Box<dyn Error + Send + Sync>),
    /// The hub ended the response body.
    Closed,
}

/// A source of SSE events for one URL.
pub trait EventTransport: Send {
    /// Start connecting to `url`. Events arrive on the returned channel in
    /// delivery order.
    fn open(&mut self, url: Url) -> mpsc::Receiver<TransportEvent>;

    /// Tear down the connection. Safe to call more than once.
    fn release(&mut self);
}

/// Streams events over HTTPS from a hub.
pub struct HttpTransport {
    http: Client,
    authenticator: Arc<dyn Authenticator>,
    verifier: Arc<HubVerifier>,
    task: Option<JoinHandle<()>>,
}

impl HttpTransport {
    pub fn new(
        http: Client,
        authenticator: Arc<dyn Authenticator>,
        verifier: Arc<HubVerifier>,
    ) -> Self {
        Self {
            http,
            authenticator,
            verifier,
            task: None,
        }
    }
}

impl EventTransport for HttpTransport {
    fn open(&mut self, url: Url) -> mpsc::Receiver<TransportEvent> {
        self.release();

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let request = self.authenticator.authenticate(
            self.http
                .get(url)
                .header(ACCEPT, "text/event-stream")
                .header(CACHE_CONTROL, "no-cache"),
        );
        let verifier = self.verifier.clone();

        self.task = Some(tokio::spawn(pump(request, verifier, tx)));
        rx
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("releasing log stream connection");
            task.abort();
        }
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        self.release();
    }
}

async fn pump(request: RequestBuilder, verifier: Arc<HubVerifier>, tx: mpsc::Sender<TransportEvent>) {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if verifier.was_declined() {
                TransportError::VerificationDeclined
            } else {
                TransportError::Connection(Box::new(e))
            };
            let _ = tx.send(TransportEvent::Error(error)).await;
            return;
        }
    };

    let status = response.status();
    if !status.is_success() {
        let _ = tx
            .send(TransportEvent::Error(TransportError::Status(status.as_u16())))
            .await;
        return;
    }

    if tx.send(TransportEvent::Open).await.is_err() {
        return;
    }

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                for event in decoder.feed(&bytes) {
                    if tx.send(TransportEvent::Event(event)).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                let _ = tx
                    .send(TransportEvent::Error(TransportError::Connection(Box::new(e))))
                    .await;
                return;
            }
        }
    }

    let _ = tx.send(TransportEvent::Error(TransportError::Closed)).await;
}
