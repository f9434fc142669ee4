//! Outcome classification
//!
//! Classifies a retrieved page before any parsing of its statistics. The
//! order of the checks matters: symptoms overlap (a block page also lacks
//! entity context, a not-found page may still carry a heading), so the first
//! matching rule wins.
//!
//! | Order | Condition | Verdict |
//! |-------|-----------|---------|
//! | 1 | HTTP 429 | `RateLimited` |
//! | 2 | HTTP 403 or block-page markers | `Blocked` |
//! | 3 | HTTP 404/410, not-found markers, or no entity context | `InvalidTarget` |
//! | 4 | Any other non-2xx status | `TransientError` |
//! | 5 | Context present, no table | `NoDataYet` |
//! | 6 | Context and table present | defer to the extractor |

use crate::acquire::landmarks::LandmarkDetector;
use crate::state::FetchOutcome;
use crate::transport::TransportError;
use scraper::Html;
use std::sync::Arc;

/// Classification of one retrieved page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The page's outcome is known without extraction
    Settled(FetchOutcome),

    /// Entity context and a table are present; extraction decides
    Extract,
}

impl Verdict {
    pub fn is_extract(&self) -> bool {
        matches!(self, Self::Extract)
    }
}

/// Applies the decision order to status codes and page landmarks
#[derive(Clone)]
pub struct Classifier {
    landmarks: Arc<dyn LandmarkDetector>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier").finish_non_exhaustive()
    }
}

impl Classifier {
    pub fn new(landmarks: Arc<dyn LandmarkDetector>) -> Self {
        Self { landmarks }
    }

    /// Classifies raw page content
    pub fn classify(&self, status: u16, content: &str) -> Verdict {
        if status == 429 {
            return Verdict::Settled(FetchOutcome::RateLimited);
        }

        let document = Html::parse_document(content);
        self.classify_document(status, &document)
    }

    /// Classifies an already parsed page
    pub fn classify_document(&self, status: u16, document: &Html) -> Verdict {
        if status == 429 {
            return Verdict::Settled(FetchOutcome::RateLimited);
        }

        let has_table = !self.landmarks.candidate_tables(document).is_empty();

        if status == 403 || self.landmarks.is_block_page(document, has_table) {
            return Verdict::Settled(FetchOutcome::Blocked);
        }

        if status == 404 || status == 410 {
            return Verdict::Settled(FetchOutcome::InvalidTarget);
        }

        if !(200..300).contains(&status) {
            return Verdict::Settled(FetchOutcome::TransientError(format!("HTTP {}", status)));
        }

        if self.landmarks.is_not_found(document, has_table) {
            tracing::debug!("Not-found marker present");
            return Verdict::Settled(FetchOutcome::InvalidTarget);
        }

        if !self.landmarks.has_entity_context(document) {
            tracing::debug!(has_table, "No entity context on page");
            return Verdict::Settled(FetchOutcome::InvalidTarget);
        }

        if !has_table {
            return Verdict::Settled(FetchOutcome::NoDataYet);
        }

        Verdict::Extract
    }
}

/// Classifies a failure to retrieve the page at all
pub fn classify_failure(error: &TransportError) -> FetchOutcome {
    FetchOutcome::TransientError(error.to_string())
}
