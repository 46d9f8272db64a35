//! Trust-on-first-use certificate pinning for hubs.
//!
//! Hubs serve self-signed certificates, so chain validation is replaced by a
//! known-hubs lookup: an unknown or changed fingerprint is shown to the
//! operator, who decides whether to continue. Handshake signatures are still
//! verified with the crypto provider.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, SignatureScheme};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::address::Authority;
use crate::error::CoreError;
use crate::storage::TrustStore;

/// Operator interaction needed by the verifier.
///
/// Called synchronously from inside the TLS handshake; the handshake waits
/// for the answer.
pub trait HostConfirmation: Send + Sync {
    /// Warn that `authority` presented an unknown or changed `fingerprint`
    /// and ask whether to continue connecting.
    fn confirm(&self, authority: &str, fingerprint: &str) -> bool;

    /// Report that `authority` was added to the known hubs.
    fn added(&self, authority: &str);
}

/// Outcome of checking a presented fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Fingerprint matched the stored entry.
    Trusted,
    /// Operator accepted a new or changed fingerprint.
    Accepted,
    /// Operator refused the fingerprint.
    Declined,
}

/// SHA-256 fingerprint of a DER certificate as `AA:BB:...`.
pub fn fingerprint(der: &[u8]) -> String {
    Sha256::digest(der)
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Certificate verifier bound to one hub authority.
pub struct HubVerifier {
    authority: String,
    store: Arc<Mutex<TrustStore>>,
    confirmation: Arc<dyn HostConfirmation>,
    declined: AtomicBool,
    provider: Arc<CryptoProvider>,
}

impl HubVerifier {
    pub fn new(
        authority: &Authority,
        store: Arc<Mutex<TrustStore>>,
        confirmation: Arc<dyn HostConfirmation>,
    ) -> Self {
        Self {
            authority: authority.to_string(),
            store,
            confirmation,
            declined: AtomicBool::new(false),
            provider: Arc::new(ring::default_provider()),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Whether the operator has refused this hub's certificate.
    pub fn was_declined(&self) -> bool {
        self.declined.load(Ordering::SeqCst)
    }

    /// Decide whether `fingerprint` is trusted, prompting when it is not known.
    pub fn check_fingerprint(&self, fingerprint: &str) -> Verdict {
        if self.was_declined() {
            return Verdict::Declined;
        }

        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);

        let known = store
            .lookup(&self.authority)
            .is_some_and(|hub| hub.fingerprint == fingerprint);
        if known {
            debug!(authority = %self.authority, "hub certificate matches known fingerprint");
            return Verdict::Trusted;
        }

        if !self.confirmation.confirm(&self.authority, fingerprint) {
            self.declined.store(true, Ordering::SeqCst);
            return Verdict::Declined;
        }

        if let Err(e) = store.record(&self.authority, fingerprint) {
            warn!(authority = %self.authority, error = %e, "failed to save known hubs");
        }
        self.confirmation.added(&self.authority);

        Verdict::Accepted
    }

    /// Build a rustls client configuration that verifies peers with `self`.
    pub fn client_config(self: &Arc<Self>) -> Result<ClientConfig, CoreError> {
        let config = ClientConfig::builder_with_provider(self.provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| CoreError::Other(format!("TLS configuration error: {}", e)))?
            .dangerous()
            .with_custom_certificate_verifier(self.clone())
            .with_no_client_auth();

        Ok(config)
    }
}

impl fmt::Debug for HubVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubVerifier")
            .field("authority", &self.authority)
            .field("declined", &self.was_declined())
            .finish_non_exhaustive()
    }
}

impl ServerCertVerifier for HubVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        match self.check_fingerprint(&fingerprint(end_entity.as_ref())) {
            Verdict::Trusted | Verdict::Accepted => Ok(ServerCertVerified::assertion()),
            Verdict::Declined => Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            )),
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    /// Confirmation stub answering every prompt the same way.
    pub(crate) struct ScriptedConfirmation {
        pub answer: bool,
        pub prompts: Mutex<Vec<(String, String)>>,
        pub added: Mutex<Vec<String>>,
    }

    impl ScriptedConfirmation {
        pub(crate) fn new(answer: bool) -> Arc<Self> {
            Arc::new(Self {
                answer,
                prompts: Mutex::new(Vec::new()),
                added: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl HostConfirmation for ScriptedConfirmation {
        fn confirm(&self, authority: &str, fingerprint: &str) -> bool {
            self.prompts
                .lock()
                .unwrap()
                .push((authority.to_string(), fingerprint.to_string()));
            self.answer
        }

        fn added(&self, authority: &str) {
            self.added.lock().unwrap().push(authority.to_string());
        }
    }

    fn authority() -> Authority {
        Authority::new(Ipv4Addr::new(10, 0, 0, 5), 9495)
    }

    fn verifier_with(
        answer: bool,
    ) -> (HubVerifier, Arc<Mutex<TrustStore>>, Arc<ScriptedConfirmation>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(Mutex::new(TrustStore::open_in(tmp.path()).unwrap()));
        let confirmation = ScriptedConfirmation::new(answer);
        let verifier = HubVerifier::new(&authority(), store.clone(), confirmation.clone());
        (verifier, store, confirmation, tmp)
    }

    #[test]
    fn test_fingerprint_format() {
        let fp = fingerprint(b"certificate");
        let pairs: Vec<&str> = fp.split(':').collect();
        assert_eq!(pairs.len(), 32);
        assert!(pairs
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase())));
        assert_eq!(fp, fingerprint(b"certificate"));
        assert_ne!(fp, fingerprint(b"other certificate"));
    }

    #[test]
    fn test_unknown_hub_accepted_is_recorded() {
        let (verifier, store, confirmation, tmp) = verifier_with(true);

        assert_eq!(verifier.check_fingerprint("AA:BB"), Verdict::Accepted);
        assert_eq!(confirmation.prompt_count(), 1);
        assert_eq!(*confirmation.added.lock().unwrap(), vec!["10.0.0.5:9495"]);
        assert_eq!(
            store.lock().unwrap().lookup("10.0.0.5:9495").unwrap().fingerprint,
            "AA:BB"
        );

        let reloaded = TrustStore::open_in(tmp.path()).unwrap();
        assert_eq!(reloaded.lookup("10.0.0.5:9495").unwrap().fingerprint, "AA:BB");
    }

    #[test]
    fn test_unknown_hub_declined_leaves_store_unchanged() {
        let (verifier, store, confirmation, _tmp) = verifier_with(false);

        assert_eq!(verifier.check_fingerprint("AA:BB"), Verdict::Declined);
        assert!(verifier.was_declined());
        assert!(store.lock().unwrap().is_empty());
        assert!(confirmation.added.lock().unwrap().is_empty());
    }

    #[test]
    fn test_known_fingerprint_is_silent() {
        let (verifier, store, confirmation, _tmp) = verifier_with(false);
        store.lock().unwrap().record("10.0.0.5:9495", "AA:BB").unwrap();

        assert_eq!(verifier.check_fingerprint("AA:BB"), Verdict::Trusted);
        assert_eq!(confirmation.prompt_count(), 0);
    }

    #[test]
    fn test_changed_fingerprint_always_prompts() {
        for answer in [true, false] {
            let (verifier, store, confirmation, _tmp) = verifier_with(answer);
            store.lock().unwrap().record("10.0.0.5:9495", "AA:BB").unwrap();

            let verdict = verifier.check_fingerprint("CC:DD");
            assert_eq!(confirmation.prompt_count(), 1);
            assert_eq!(
                confirmation.prompts.lock().unwrap()[0],
                ("10.0.0.5:9495".to_string(), "CC:DD".to_string())
            );

            let stored = store.lock().unwrap().lookup("10.0.0.5:9495").unwrap().fingerprint.clone();
            if answer {
                assert_eq!(verdict, Verdict::Accepted);
                assert_eq!(stored, "CC:DD");
            } else {
                assert_eq!(verdict, Verdict::Declined);
                assert_eq!(stored, "AA:BB");
            }
        }
    }

    #[test]
    fn test_decline_is_sticky() {
        let (verifier, _store, confirmation, _tmp) = verifier_with(false);

        assert_eq!(verifier.check_fingerprint("AA:BB"), Verdict::Declined);
        assert_eq!(verifier.check_fingerprint("AA:BB"), Verdict::Declined);
        assert_eq!(confirmation.prompt_count(), 1);
    }

    #[test]
    fn test_accepted_fingerprint_is_trusted_on_next_handshake() {
        let (verifier, _store, confirmation, _tmp) = verifier_with(true);

        assert_eq!(verifier.check_fingerprint("AA:BB"), Verdict::Accepted);
        assert_eq!(verifier.check_fingerprint("AA:BB"), Verdict::Trusted);
        assert_eq!(confirmation.prompt_count(), 1);
    }

    #[test]
    fn test_client_config_builds() {
        let (verifier, _store, _confirmation, _tmp) = verifier_with(true);
        let verifier = Arc::new(verifier);
        assert!(verifier.client_config().is_ok());
    }
}
