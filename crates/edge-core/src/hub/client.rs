//! HTTP client for a hub's local live log API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use tracing::debug;

use super::connection::describe_connection_error;
use super::verifier::HubVerifier;
use crate::address::Authority;
use crate::error::{CoreError, HubError};
use crate::protocol::DriverInfo;
use crate::selector::DriverSource;
use crate::stream::HttpTransport;

/// Default timeout for REST calls to the hub. The log stream itself has none.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Adds credentials to outgoing hub requests.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Bearer token authentication.
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authenticator for BearerToken {
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }
}

/// Sends requests without credentials.
pub struct Anonymous;

impl Authenticator for Anonymous {
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }
}

/// Client bound to one hub authority.
pub struct LiveLogClient {
    authority: Authority,
    base_url: Url,
    http: Client,
    authenticator: Arc<dyn Authenticator>,
    verifier: Arc<HubVerifier>,
    timeout: Duration,
}

impl LiveLogClient {
    pub fn new(
        authority: Authority,
        authenticator: Arc<dyn Authenticator>,
        verifier: Arc<HubVerifier>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let base_url = Url::parse(&authority.base_url())
            .map_err(|e| CoreError::InvalidAddress(format!("{}: {}", authority, e)))?;

        let http = Client::builder()
            .use_preconfigured_tls(verifier.client_config()?)
            .build()
            .map_err(|e| CoreError::Other(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            authority,
            base_url,
            http,
            authenticator,
            verifier,
            timeout,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// List the drivers currently installed on the hub.
    pub async fn get_drivers(&self) -> Result<Vec<DriverInfo>, CoreError> {
        let response = self.get(self.drivers_url()).await?;

        response.json().await.map_err(|e| {
            HubError::InvalidResponse {
                authority: self.authority.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Resolve the log stream URL for one driver, or every driver when `None`.
    ///
    /// Confirms the hub is reachable and accepts our credentials first, which
    /// also runs certificate verification before the stream is opened.
    pub async fn get_log_source(&self, driver_id: Option<&str>) -> Result<Url, CoreError> {
        self.get(self.drivers_url()).await?;
        Ok(self.log_source_url(driver_id))
    }

    /// The log stream URL without contacting the hub.
    pub fn log_source_url(&self, driver_id: Option<&str>) -> Url {
        let mut url = self.endpoint("drivers/logs");
        if let Some(id) = driver_id {
            url.query_pairs_mut().append_pair("driver_id", id);
        }
        url
    }

    /// A transport for streaming from this hub with the same TLS and credentials.
    pub fn transport(&self) -> HttpTransport {
        HttpTransport::new(
            self.http.clone(),
            self.authenticator.clone(),
            self.verifier.clone(),
        )
    }

    fn drivers_url(&self) -> Url {
        self.endpoint("drivers")
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    async fn get(&self, url: Url) -> Result<Response, CoreError> {
        debug!(%url, "hub request");

        let request = self.authenticator.authenticate(self.http.get(url).timeout(self.timeout));
        let response = request.send().await.map_err(|e| self.send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(&self.authority, status.as_u16()).into());
        }

        Ok(response)
    }

    fn send_error(&self, error: reqwest::Error) -> CoreError {
        let authority = self.authority.to_string();

        if self.verifier.was_declined() {
            return HubError::VerificationFailed { authority }.into();
        }

        let cause = describe_connection_error(&authority, &error);
        HubError::Unreachable { authority, cause }.into()
    }
}

/// Error for a non-success REST response.
fn status_error(authority: &Authority, status: u16) -> HubError {
    let authority = authority.to_string();
    match status {
        401 | 403 => HubError::Unauthorized { authority },
        status => HubError::Rejected { authority, status },
    }
}

#[async_trait]
impl DriverSource for LiveLogClient {
    async fn drivers(&self) -> Result<Vec<DriverInfo>, CoreError> {
        self.get_drivers().await
    }
}
