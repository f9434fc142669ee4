//! Page sources
//!
//! A page source turns a URL plus the current identity into raw page content.
//! It does no classification: status codes and bodies are handed back as-is
//! and only network-level failures become errors.

pub mod http;

#[cfg(feature = "browser")]
pub mod browser;

pub use http::{build_http_client, HttpPageSource};

#[cfg(feature = "browser")]
pub use browser::BrowserPageSource;

use crate::acquire::Identity;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Raw page as returned by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// HTTP status of the main document
    pub status: u16,

    /// Page HTML (rendered DOM for the browser transport)
    pub content: String,

    /// URL after redirects
    pub final_url: String,
}

impl PageResponse {
    pub fn new(status: u16, content: impl Into<String>, final_url: impl Into<String>) -> Self {
        Self {
            status,
            content: content.into(),
            final_url: final_url.into(),
        }
    }
}

/// Failure to retrieve a page at all
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Timed out after {after_ms} ms fetching {url}")]
    Timeout { url: String, after_ms: u64 },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Retrieves page content for a URL using a given identity
///
/// Implementations keep whatever session they need (cookie jar, browser
/// instance) keyed on [`Identity::session`], starting a fresh one when the
/// session changes.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Loads one page, bounded by `timeout`
    async fn load(
        &self,
        url: &Url,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<PageResponse, TransportError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
