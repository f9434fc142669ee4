//! Headless browser page source
//!
//! For sites that render their statistics client-side. A Chromium instance is
//! launched per identity session with automation fingerprints scrubbed, and
//! relaunched whenever the identity is rotated.

use crate::acquire::identity::{browser_directives, StealthDirectives};
use crate::acquire::Identity;
use crate::config::BrowserConfig;
use crate::transport::{PageResponse, PageSource, TransportError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, Headers, ResourceType, SetExtraHttpHeadersParams,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::{FutureExt, StreamExt};
use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

fn browser_error(err: impl std::fmt::Display) -> TransportError {
    TransportError::Browser(err.to_string())
}

/// A document response observed while a page loaded
#[derive(Debug, Clone, PartialEq)]
struct DocumentResponse {
    frame: Option<String>,
    status: u16,
}

/// Status of the first document response belonging to the main frame
///
/// Iframes load documents of their own; their statuses say nothing about the
/// page itself. Without a known main frame the first document wins.
fn main_document_status(responses: &[DocumentResponse], main_frame: Option<&str>) -> Option<u16> {
    responses
        .iter()
        .find(|response| match main_frame {
            Some(main) => response.frame.as_deref() == Some(main),
            None => true,
        })
        .map(|response| response.status)
}

/// One running browser bound to an identity session
struct BrowserSession {
    session: u64,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    async fn render(&self, url: &Url, settle: Duration) -> Result<PageResponse, TransportError> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(browser_error)?;

        self.page.goto(url.as_str()).await.map_err(browser_error)?;
        tokio::time::sleep(settle).await;

        let main_frame = self
            .page
            .mainframe()
            .await
            .map_err(browser_error)?
            .map(|frame| frame.inner().clone());

        let mut documents = Vec::new();
        while let Some(Some(event)) = responses.next().now_or_never() {
            if event.r#type == ResourceType::Document {
                documents.push(DocumentResponse {
                    frame: event.frame_id.as_ref().map(|frame| frame.inner().clone()),
                    status: event.response.status as u16,
                });
            }
        }
        let status = main_document_status(&documents, main_frame.as_deref());

        let content = self.page.content().await.map_err(browser_error)?;
        let final_url = self
            .page
            .url()
            .await
            .map_err(browser_error)?
            .unwrap_or_else(|| url.to_string());

        debug!(url = %final_url, status = ?status, bytes = content.len(), "Rendered page");

        Ok(PageResponse {
            status: status.unwrap_or(200),
            content,
            final_url,
        })
    }

    async fn shutdown(mut self) {
        info!(session = self.session, "Closing browser session");
        if let Err(err) = self.browser.close().await {
            warn!(error = %err, "Failed to close browser gracefully");
        }
        self.handler.abort();
    }
}

/// Page source backed by a Chromium instance driven over CDP
pub struct BrowserPageSource {
    config: BrowserConfig,
    session: Mutex<Option<BrowserSession>>,
}

impl std::fmt::Debug for BrowserPageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserPageSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BrowserPageSource {
    /// Creates the source; the browser itself is launched on first use
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    fn settle_delay(&self) -> Duration {
        let [min, max] = self.config.settle_ms;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    fn launch_config(&self, directives: &StealthDirectives) -> Result<ChromiumConfig, TransportError> {
        let mut builder = ChromiumConfig::builder()
            .viewport(Viewport {
                width: directives.viewport_width,
                height: directives.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: directives.viewport_width >= directives.viewport_height,
                has_touch: false,
            })
            .args(directives.launch_args.clone());

        if let Some(path) = &self.config.executable_path {
            builder = builder.chrome_executable(path);
        }
        if !self.config.headless {
            builder = builder.with_head();
        }
        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }

        builder.build().map_err(TransportError::Browser)
    }

    async fn launch(&self, identity: &Identity) -> Result<BrowserSession, TransportError> {
        let directives = browser_directives(identity, &self.config, &mut rand::thread_rng());
        let launch_config = self.launch_config(&directives)?;

        info!(
            identity = %identity.label,
            session = identity.session,
            width = directives.viewport_width,
            height = directives.viewport_height,
            headless = self.config.headless,
            "Launching browser"
        );

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(browser_error)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "Browser handler reported error");
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(browser_error)?;
        configure_page(&page, identity, &directives).await?;

        Ok(BrowserSession {
            session: identity.session,
            browser,
            page,
            handler,
        })
    }
}

/// Applies stealth scripts and identity headers to a fresh page
async fn configure_page(
    page: &Page,
    identity: &Identity,
    directives: &StealthDirectives,
) -> Result<(), TransportError> {
    page.enable_stealth_mode_with_agent(&identity.user_agent)
        .await
        .map_err(browser_error)?;

    for script in &directives.init_scripts {
        page.evaluate_on_new_document(
            AddScriptToEvaluateOnNewDocumentParams::builder()
                .source(script.clone())
                .build()
                .map_err(TransportError::Browser)?,
        )
        .await
        .map_err(browser_error)?;
    }

    if !identity.headers.is_empty() {
        let headers = identity
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
            .collect::<serde_json::Map<_, _>>();

        page.execute(SetExtraHttpHeadersParams::new(Headers::new(
            serde_json::Value::Object(headers),
        )))
        .await
        .map_err(browser_error)?;
    }

    Ok(())
}

#[async_trait]
impl PageSource for BrowserPageSource {
    async fn load(
        &self,
        url: &Url,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<PageResponse, TransportError> {
        let mut guard = self.session.lock().await;

        let stale = guard
            .as_ref()
            .map_or(true, |session| session.session != identity.session);
        if stale {
            if let Some(previous) = guard.take() {
                previous.shutdown().await;
            }
            *guard = Some(self.launch(identity).await?);
        }

        let session = guard
            .as_ref()
            .ok_or_else(|| TransportError::Browser("browser session unavailable".to_string()))?;

        let settle = self.settle_delay();
        match tokio::time::timeout(timeout, session.render(url, settle)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                url: url.to_string(),
                after_ms: timeout.as_millis() as u64,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
