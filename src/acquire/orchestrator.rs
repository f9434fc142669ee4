//! Fetch orchestration
//!
//! The orchestrator drives one call of [`Orchestrator::fetch_entity_stats`]:
//!
//! 1. Wait for the pacing delay (skipped before the very first request)
//! 2. Load the page through the configured transport with the current identity
//! 3. Classify the page, extracting records when a table is present
//! 4. Update the request state and rotate the identity after a block
//! 5. Retry retryable outcomes up to the attempt limit
//!
//! Calls on one orchestrator are strictly sequential (`&mut self`), so pacing
//! and backoff state carries from one call into the next.

use crate::acquire::classifier::{classify_failure, Classifier, Verdict};
use crate::acquire::extractor::TableExtractor;
use crate::acquire::identity::{Identity, IdentityManager};
use crate::acquire::landmarks::{LandmarkDetector, MarkerLandmarks};
use crate::acquire::pacing::PacingController;
use crate::config::{validate, Config, TransportKind};
use crate::output::FetchResult;
use crate::state::{FetchOutcome, RequestState};
use crate::transport::{HttpPageSource, PageResponse, PageSource};
use crate::{Result, ScoutError};
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Sequential, self-pacing fetcher for one target site
pub struct Orchestrator {
    config: Arc<Config>,
    source: Box<dyn PageSource>,
    landmarks: Arc<dyn LandmarkDetector>,
    classifier: Classifier,
    extractor: TableExtractor,
    pacing: PacingController,
    identities: IdentityManager,
    state: RequestState,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("site", &self.config.site.name)
            .field("source", &self.source.name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator with an injected page source and landmark detector
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to fetch
    /// * `Err(ScoutError)` - The configuration is invalid
    pub fn new(
        config: Config,
        source: Box<dyn PageSource>,
        landmarks: Arc<dyn LandmarkDetector>,
    ) -> Result<Self> {
        validate(&config)?;

        let identities = IdentityManager::new(config.identities.clone())?;
        let pacing = PacingController::new(config.pacing.clone());
        let classifier = Classifier::new(Arc::clone(&landmarks));
        let extractor = TableExtractor::new(Arc::clone(&landmarks))?;

        tracing::info!(
            site = %config.site.name,
            source = source.name(),
            identities = identities.pool_size(),
            "Orchestrator ready"
        );

        Ok(Self {
            config: Arc::new(config),
            source,
            landmarks,
            classifier,
            extractor,
            pacing,
            identities,
            state: RequestState::new(),
        })
    }

    /// Creates an orchestrator whose transport and landmarks come from `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let landmarks: Arc<dyn LandmarkDetector> =
            Arc::new(MarkerLandmarks::from_config(&config.landmarks)?);

        let source: Box<dyn PageSource> = match config.fetch.transport {
            TransportKind::Http => Box::new(HttpPageSource::new(&config.fetch)),
            #[cfg(feature = "browser")]
            TransportKind::Browser => Box::new(crate::transport::BrowserPageSource::new(
                config.browser.clone(),
            )),
            #[cfg(not(feature = "browser"))]
            TransportKind::Browser => {
                return Err(ScoutError::Browser(
                    "browser transport requires the `browser` feature".to_string(),
                ))
            }
        };

        Self::new(config, source, landmarks)
    }

    /// Replaces the pacing randomness with a seeded generator
    pub fn with_pacing_seed(mut self, seed: u64) -> Self {
        self.pacing = PacingController::with_seed(self.config.pacing.clone(), seed);
        self
    }

    /// Builds the URL for a target
    ///
    /// `domain_hint` selects an alternative host from `site.domain-hosts`;
    /// unknown hints fall back to the site's base URL. Target ids are opaque
    /// but must be URL-safe (`A-Z a-z 0-9 - _ . ~`).
    pub fn target_url(&self, target_id: &str, domain_hint: &str) -> Result<Url> {
        let target_id = target_id.trim();
        if target_id.is_empty() {
            return Err(ScoutError::InvalidTarget("empty target id".to_string()));
        }
        if !target_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
        {
            return Err(ScoutError::InvalidTarget(format!(
                "target id '{}' contains characters that are not URL-safe",
                target_id
            )));
        }

        let site = &self.config.site;
        let base = site
            .domain_hosts
            .get(domain_hint)
            .unwrap_or(&site.base_url);

        let path = site.path_template.replace("{target}", target_id);
        Ok(Url::parse(base)?.join(&path)?)
    }

    /// Fetches and parses the statistics page of one target
    ///
    /// Never fails: every page outcome, including blocks, rate limits and
    /// network failures after the last attempt, is reported in the returned
    /// [`FetchResult`].
    pub async fn fetch_entity_stats(&mut self, target_id: &str, domain_hint: &str) -> FetchResult {
        let url = match self.target_url(target_id, domain_hint) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(target_id, error = %e, "Cannot build URL for target");
                return FetchResult::new(
                    FetchOutcome::InvalidTarget,
                    self.config.site.name.as_str(),
                    target_id,
                    "",
                    0,
                    None,
                );
            }
        };

        let timeout = Duration::from_millis(self.config.fetch.timeout_ms);
        let max_attempts = self.config.fetch.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.wait_before_request(target_id, attempt).await;

            let identity = self.identities.current_identity().clone();
            self.state
                .mark_request(tokio::time::Instant::now().into_std());

            tracing::info!(
                target_id,
                attempt,
                max_attempts,
                identity = %identity.label,
                url = %url,
                "Fetching"
            );

            let (outcome, season, final_url) =
                match self.source.load(&url, &identity, timeout).await {
                    Ok(response) => {
                        let (outcome, season) = self.evaluate(&response);
                        (outcome, season, response.final_url)
                    }
                    Err(e) => {
                        tracing::warn!(target_id, attempt, error = %e, "Transport failure");
                        (classify_failure(&e), None, url.to_string())
                    }
                };

            match outcome.backoff_class() {
                Some(class) => self.state.record_failure(class),
                None => self.state.record_success(),
            }

            if outcome.requires_rotation() {
                self.identities.rotate();
            }

            if outcome.is_retryable() && attempt < max_attempts {
                tracing::warn!(
                    target_id,
                    attempt,
                    outcome = outcome.label(),
                    errors = self.state.consecutive_error_count,
                    "Retrying"
                );
                continue;
            }

            if outcome.is_retryable() {
                tracing::warn!(
                    target_id,
                    attempts = attempt,
                    outcome = %outcome,
                    "Giving up after final attempt"
                );
            } else {
                tracing::info!(
                    target_id,
                    attempts = attempt,
                    outcome = outcome.label(),
                    records = outcome.records().len(),
                    "Fetch complete"
                );
            }

            return FetchResult::new(
                outcome,
                self.config.site.name.as_str(),
                target_id,
                final_url,
                attempt,
                season,
            );
        }
    }

    /// Sleeps for the pacing delay, minus time already spent since the last request
    async fn wait_before_request(&mut self, target_id: &str, attempt: u32) {
        let plan = self.pacing.plan(&mut self.state);

        if self.state.is_first_request() {
            tracing::debug!(target_id, "First request, no pacing wait");
            return;
        }

        let elapsed = self
            .state
            .since_last_request(tokio::time::Instant::now().into_std())
            .unwrap_or_default();
        let wait = plan.total().saturating_sub(elapsed);

        tracing::debug!(
            target_id,
            attempt,
            base_ms = plan.base.as_millis() as u64,
            backoff_ms = plan.backoff.as_millis() as u64,
            jitter_ms = plan.jitter.as_millis() as u64,
            break_ms = plan.extended_break.map(|d| d.as_millis() as u64),
            delay_ms = wait.as_millis() as u64,
            "Pacing wait"
        );

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Classifies a response and extracts its records
    fn evaluate(&self, response: &PageResponse) -> (FetchOutcome, Option<String>) {
        let document = Html::parse_document(&response.content);
        let season = self.landmarks.season_label(&document);

        let outcome = match self.classifier.classify_document(response.status, &document) {
            Verdict::Settled(outcome) => outcome,
            Verdict::Extract => {
                let records = self.extractor.extract_document(&document);
                if records.is_empty() {
                    tracing::debug!("Table present but no entity rows");
                    FetchOutcome::NoDataYet
                } else {
                    FetchOutcome::Success(records)
                }
            }
        };

        tracing::debug!(
            status = response.status,
            outcome = outcome.label(),
            "Classified page"
        );

        (outcome, season)
    }

    /// Pacing and error state carried between calls
    pub fn request_state(&self) -> &RequestState {
        &self.state
    }

    /// The identity the next request will use
    pub fn current_identity(&self) -> &Identity {
        self.identities.current_identity()
    }

    /// Identity rotations performed over this orchestrator's lifetime
    pub fn identity_rotations(&self) -> u32 {
        self.identities.rotations()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl PageSource for Unreachable {
        async fn load(
            &self,
            url: &Url,
            _identity: &Identity,
            _timeout: Duration,
        ) -> std::result::Result<PageResponse, TransportError> {
            Err(TransportError::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    fn orchestrator() -> Orchestrator {
        let mut config = Config::for_site(
            "tfrrs",
            "https://www.tfrrs.org",
            "/teams/{target}.html",
        );
        config
            .site
            .domain_hosts
            .insert("cross_country".to_string(), "https://xc.tfrrs.org".to_string());
        config.fetch.max_attempts = 2;

        let landmarks = Arc::new(MarkerLandmarks::from_config(&config.landmarks).unwrap());
        Orchestrator::new(config, Box::new(Unreachable), landmarks).unwrap()
    }

    #[test]
    fn test_target_url_uses_domain_hint() {
        let orchestrator = orchestrator();

        assert_eq!(
            orchestrator
                .target_url("PA_college_m_Haverford", "track")
                .unwrap()
                .as_str(),
            "https://www.tfrrs.org/teams/PA_college_m_Haverford.html"
        );
        assert_eq!(
            orchestrator
                .target_url("PA_college_m_Haverford", "cross_country")
                .unwrap()
                .as_str(),
            "https://xc.tfrrs.org/teams/PA_college_m_Haverford.html"
        );
    }

    #[test]
    fn test_target_url_rejects_unsafe_ids() {
        let orchestrator = orchestrator();
        for id in ["", "../admin", "1 OR 1=1"] {
            assert!(matches!(
                orchestrator.target_url(id, "track"),
                Err(ScoutError::InvalidTarget(_))
            ));
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::for_site("s", "https://example.com", "/t/{target}");
        config.fetch.max_attempts = 0;

        let landmarks = Arc::new(MarkerLandmarks::from_config(&config.landmarks).unwrap());
        let result = Orchestrator::new(config, Box::new(Unreachable), landmarks);
        assert!(matches!(result, Err(ScoutError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_target_id_is_reported_not_fetched() {
        let mut orchestrator = orchestrator();
        let result = orchestrator.fetch_entity_stats("bad id", "track").await;

        assert_eq!(result.outcome(), &FetchOutcome::InvalidTarget);
        assert_eq!(result.attempts(), 0);
        assert!(orchestrator.request_state().is_first_request());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_retried_then_returned() {
        let mut orchestrator = orchestrator();
        let result = orchestrator.fetch_entity_stats("611523", "").await;

        assert!(matches!(
            result.outcome(),
            FetchOutcome::TransientError(detail) if detail.contains("connection refused")
        ));
        assert_eq!(result.attempts(), 2);
        assert_eq!(orchestrator.request_state().consecutive_error_count, 2);
        assert_eq!(orchestrator.identity_rotations(), 0);
    }
}
