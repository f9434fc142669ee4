//! The uniform value returned by every fetch call

use crate::output::StatRecord;
use crate::state::FetchOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one `fetch_entity_stats` call
///
/// Constructed once by the orchestrator and handed to the caller; its fields
/// are read-only from the outside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult {
    outcome: FetchOutcome,
    source: String,
    fetched_at: DateTime<Utc>,
    target_id: String,
    url: String,
    attempts: u32,
    season: Option<String>,
}

impl FetchResult {
    pub(crate) fn new(
        outcome: FetchOutcome,
        source: impl Into<String>,
        target_id: impl Into<String>,
        url: impl Into<String>,
        attempts: u32,
        season: Option<String>,
    ) -> Self {
        Self {
            outcome,
            source: source.into(),
            fetched_at: Utc::now(),
            target_id: target_id.into(),
            url: url.into(),
            attempts,
            season,
        }
    }

    pub fn outcome(&self) -> &FetchOutcome {
        &self.outcome
    }

    /// Name of the data source the page came from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// URL of the last attempt
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Attempts spent, including the first
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Season label found on the page (e.g. "2025-26")
    pub fn season(&self) -> Option<&str> {
        self.season.as_deref()
    }

    /// Records of a successful fetch; empty for every other outcome
    pub fn records(&self) -> &[StatRecord] {
        self.outcome.records()
    }

    /// Consumes the result, yielding its outcome
    pub fn into_outcome(self) -> FetchOutcome {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::StatFields;

    #[test]
    fn test_accessors() {
        let record = StatRecord::new("Avery Jones", StatFields::new());
        let result = FetchResult::new(
            FetchOutcome::Success(vec![record.clone()]),
            "stats.ncaa.org",
            "611523",
            "https://stats.ncaa.org/teams/611523/season_to_date_stats",
            2,
            Some("2025-26".to_string()),
        );

        assert_eq!(result.source(), "stats.ncaa.org");
        assert_eq!(result.target_id(), "611523");
        assert_eq!(result.attempts(), 2);
        assert_eq!(result.season(), Some("2025-26"));
        assert_eq!(result.records(), &[record]);
        assert!(result.fetched_at() <= Utc::now());
    }

    #[test]
    fn test_records_empty_for_non_success() {
        let result = FetchResult::new(FetchOutcome::NoDataYet, "s", "t", "u", 1, None);
        assert!(result.records().is_empty());
        assert_eq!(result.into_outcome(), FetchOutcome::NoDataYet);
    }

    #[test]
    fn test_serializes_outcome_tag() {
        let result = FetchResult::new(FetchOutcome::InvalidTarget, "s", "999", "u", 1, None);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["outcome"]["kind"], "invalid_target");
        assert_eq!(json["target_id"], "999");
        assert!(json["fetched_at"].is_string());
    }
}
