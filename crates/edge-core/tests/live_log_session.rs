//! End-to-end session scenarios against a scripted hub.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use edge_core::hub::{fingerprint, HostConfirmation, HubVerifier, Verdict};
use edge_core::protocol::{LogLevel, SseDecoder};
use edge_core::storage::TrustStore;
use edge_core::stream::{
    CloseReason, EventTransport, SessionEvent, SessionState, StreamSession, TransportError,
    TransportEvent,
};
use edge_core::{Authority, StreamError};
use reqwest::Url;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const HUB_CERT: &[u8] = b"hub certificate der bytes";

struct Operator {
    accept: bool,
    prompts: Mutex<Vec<String>>,
    added: Mutex<Vec<String>>,
}

impl Operator {
    fn new(accept: bool) -> Arc<Self> {
        Arc::new(Self {
            accept,
            prompts: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
        })
    }
}

impl HostConfirmation for Operator {
    fn confirm(&self, authority: &str, _fingerprint: &str) -> bool {
        self.prompts.lock().unwrap().push(authority.to_string());
        self.accept
    }

    fn added(&self, authority: &str) {
        self.added.lock().unwrap().push(authority.to_string());
    }
}

/// What the scripted hub answers once the handshake passes.
enum Reply {
    Stream(&'static [u8]),
    Status(u16),
}

/// Transport that runs certificate verification, then replays a canned body
/// through the SSE decoder.
struct ScriptedHub {
    verifier: Arc<HubVerifier>,
    reply: Option<Reply>,
    released: Arc<AtomicBool>,
    keep_alive: Option<mpsc::Sender<TransportEvent>>,
}

impl ScriptedHub {
    fn new(verifier: Arc<HubVerifier>, reply: Reply) -> Self {
        Self {
            verifier,
            reply: Some(reply),
            released: Arc::new(AtomicBool::new(false)),
            keep_alive: None,
        }
    }
}

impl EventTransport for ScriptedHub {
    fn open(&mut self, _url: Url) -> mpsc::Receiver<TransportEvent> {
        let (tx, rx) = mpsc::channel(32);

        if self.verifier.check_fingerprint(&fingerprint(HUB_CERT)) == Verdict::Declined {
            tx.try_send(TransportEvent::Error(TransportError::VerificationDeclined))
                .unwrap();
            return rx;
        }

        match self.reply.take() {
            Some(Reply::Status(status)) => {
                tx.try_send(TransportEvent::Error(TransportError::Status(status)))
                    .unwrap();
            }
            Some(Reply::Stream(body)) => {
                tx.try_send(TransportEvent::Open).unwrap();
                let mut decoder = SseDecoder::new();
                // split mid-event to exercise incremental decoding
                let (head, tail) = body.split_at(body.len() / 2);
                for event in decoder.feed(head).into_iter().chain(decoder.feed(tail)) {
                    tx.try_send(TransportEvent::Event(event)).unwrap();
                }
                self.keep_alive = Some(tx);
            }
            None => {}
        }
        rx
    }

    fn release(&mut self) {
        self.keep_alive = None;
        self.released.store(true, Ordering::SeqCst);
    }
}

fn authority() -> Authority {
    Authority::resolve("10.0.0.5:9495", 9495).unwrap()
}

fn log_url() -> Url {
    Url::parse("https://10.0.0.5:9495/drivers/logs").unwrap()
}

#[tokio::test]
async fn test_first_connection_pins_hub_and_streams_in_order() {
    let cache = tempfile::tempdir().unwrap();
    let store = Arc::new(Mutex::new(TrustStore::open_in(cache.path()).unwrap()));
    let operator = Operator::new(true);
    let verifier = Arc::new(HubVerifier::new(&authority(), store.clone(), operator.clone()));

    let body: &'static [u8] = b"data: {\"driver_name\":\"Zigbee\",\"log_level\":2,\"message\":\"first\"}\n\n\
data: {\"driver_name\":\"Zigbee\",\"log_level\":3,\"message\":\"second\"}\n\n\
: keep-alive\n\n\
data: {\"driver_name\":\"LAN\",\"log_level\":100,\"message\":\"third\"}\n\n";

    let hub = ScriptedHub::new(verifier, Reply::Stream(body));
    let released = hub.released.clone();
    let mut session = StreamSession::new(authority().to_string(), hub);
    let cancel = CancellationToken::new();

    session.init_source(log_url()).unwrap();
    assert_eq!(session.next_event(&cancel).await.unwrap(), Some(SessionEvent::Opened));

    let mut received = Vec::new();
    for _ in 0..3 {
        match session.next_event(&cancel).await.unwrap() {
            Some(SessionEvent::Message(message)) => received.push(message),
            other => panic!("expected a log message, got {:?}", other),
        }
    }

    let texts: Vec<_> = received.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(received[1].log_level, LogLevel::Warn);
    assert_eq!(received[2].log_level, LogLevel::Print);

    cancel.cancel();
    assert_eq!(session.next_event(&cancel).await.unwrap(), None);
    assert_eq!(session.state(), &SessionState::Closed(CloseReason::Normal));
    assert!(released.load(Ordering::SeqCst));

    assert_eq!(*operator.prompts.lock().unwrap(), vec!["10.0.0.5:9495"]);
    assert_eq!(*operator.added.lock().unwrap(), vec!["10.0.0.5:9495"]);

    let reloaded = TrustStore::open_in(cache.path()).unwrap();
    let entry = reloaded.lookup("10.0.0.5:9495").unwrap();
    assert_eq!(entry.fingerprint, fingerprint(HUB_CERT));
}

#[tokio::test]
async fn test_known_hub_is_not_prompted_again() {
    let cache = tempfile::tempdir().unwrap();
    let mut store = TrustStore::open_in(cache.path()).unwrap();
    store.record("10.0.0.5:9495", &fingerprint(HUB_CERT)).unwrap();

    let operator = Operator::new(false);
    let verifier = Arc::new(HubVerifier::new(
        &authority(),
        Arc::new(Mutex::new(store)),
        operator.clone(),
    ));

    let hub = ScriptedHub::new(verifier, Reply::Stream(b"data: {\"message\":\"hello\"}\n\n"));
    let mut session = StreamSession::new(authority().to_string(), hub);
    let cancel = CancellationToken::new();

    session.init_source(log_url()).unwrap();
    assert_eq!(session.next_event(&cancel).await.unwrap(), Some(SessionEvent::Opened));
    assert!(matches!(
        session.next_event(&cancel).await.unwrap(),
        Some(SessionEvent::Message(m)) if m.message == "hello"
    ));
    assert!(operator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_forbidden_stream_reports_unauthorized() {
    let cache = tempfile::tempdir().unwrap();
    let store = Arc::new(Mutex::new(TrustStore::open_in(cache.path()).unwrap()));
    let verifier = Arc::new(HubVerifier::new(&authority(), store, Operator::new(true)));

    let hub = ScriptedHub::new(verifier, Reply::Status(403));
    let released = hub.released.clone();
    let mut session = StreamSession::new(authority().to_string(), hub);

    session.init_source(log_url()).unwrap();
    let err = session
        .next_event(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Unauthorized { .. }));
    assert!(err.to_string().contains("10.0.0.5:9495"));
    assert!(matches!(session.state(), SessionState::Closed(CloseReason::Error(_))));
    assert!(released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_declined_certificate_fails_verification_without_saving() {
    let cache = tempfile::tempdir().unwrap();
    let store = Arc::new(Mutex::new(TrustStore::open_in(cache.path()).unwrap()));
    let operator = Operator::new(false);
    let verifier = Arc::new(HubVerifier::new(&authority(), store, operator.clone()));

    let hub = ScriptedHub::new(verifier, Reply::Stream(b"data: {\"message\":\"x\"}\n\n"));
    let mut session = StreamSession::new(authority().to_string(), hub);

    session.init_source(log_url()).unwrap();
    let err = session
        .next_event(&CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Hub verification failed for 10.0.0.5:9495.");
    assert!(operator.added.lock().unwrap().is_empty());
    assert!(TrustStore::open_in(cache.path()).unwrap().is_empty());
}
