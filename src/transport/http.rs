//! Plain HTTP page source
//!
//! Used for statically served pages. One `reqwest::Client` is kept per
//! identity session so its cookie jar survives across requests until the
//! identity is rotated.

use crate::acquire::Identity;
use crate::config::FetchConfig;
use crate::transport::{PageResponse, PageSource, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect::Policy, Client};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Maximum redirects followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client presenting the given identity
///
/// The client stores cookies, sends the identity's user agent and headers on
/// every request, and accepts compressed responses.
///
/// # Example
///
/// ```no_run
/// use stat_scout::acquire::IdentityManager;
/// use stat_scout::transport::build_http_client;
/// use std::time::Duration;
///
/// let identities = IdentityManager::builtin().unwrap();
/// let client = build_http_client(identities.current_identity(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    identity: &Identity,
    connect_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(identity.user_agent.as_str())
        .default_headers(header_map(identity))
        .cookie_store(true)
        .connect_timeout(connect_timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Converts identity headers, skipping any that are not valid HTTP headers
fn header_map(identity: &Identity) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in &identity.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(
                    identity = %identity.label,
                    header = %name,
                    "Skipping invalid identity header"
                );
            }
        }
    }

    headers
}

/// Page source backed by `reqwest`
#[derive(Debug)]
pub struct HttpPageSource {
    connect_timeout: Duration,
    /// Client of the current identity session
    session: Mutex<Option<(u64, Client)>>,
}

impl HttpPageSource {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            session: Mutex::new(None),
        }
    }

    /// Returns the client for the identity's session, building a new one
    /// (with an empty cookie jar) when the session changed
    fn client_for(&self, identity: &Identity) -> Result<Client, TransportError> {
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some((id, client)) = session.as_ref() {
            if *id == identity.session {
                return Ok(client.clone());
            }
        }

        let client = build_http_client(identity, self.connect_timeout).map_err(|e| {
            TransportError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            }
        })?;

        tracing::debug!(
            identity = %identity.label,
            session = identity.session,
            "Started new HTTP session"
        );
        *session = Some((identity.session, client.clone()));

        Ok(client)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn load(
        &self,
        url: &Url,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<PageResponse, TransportError> {
        let client = self.client_for(identity)?;
        let map_error = |e: reqwest::Error| classify_error(e, url, timeout);

        let response = client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(map_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content = response.text().await.map_err(map_error)?;

        tracing::debug!(url = %final_url, status, bytes = content.len(), "HTTP response");

        Ok(PageResponse {
            status,
            content,
            final_url,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Maps a reqwest error onto a transport error
fn classify_error(error: reqwest::Error, url: &Url, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
            after_ms: timeout.as_millis() as u64,
        }
    } else {
        TransportError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
