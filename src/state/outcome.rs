/// Fetch outcome definitions
///
/// This module defines every result a single fetch attempt can produce.
use crate::output::StatRecord;
use crate::state::BackoffClass;
use serde::Serialize;
use std::fmt;

/// Classified result of one fetch attempt
///
/// Exactly one variant is produced per attempt. None of them is an error in
/// the Rust sense: callers are expected to branch on all six.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchOutcome {
    // ===== Terminal, not retried =====
    /// The page held a statistics table with at least one entity row
    Success(Vec<StatRecord>),

    /// The target is valid but its data has not been published yet
    NoDataYet,

    /// The target id does not resolve to an entity page
    InvalidTarget,

    // ===== Retried with backoff =====
    /// The site signalled rate limiting (HTTP 429)
    RateLimited,

    /// The site refused this identity (HTTP 403 or a block page)
    Blocked,

    /// The page could not be retrieved (timeout, connection failure, 5xx)
    TransientError(String),
}

impl FetchOutcome {
    /// Returns true if the orchestrator should try again within the same call
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Blocked | Self::TransientError(_)
        )
    }

    /// Returns true if this outcome carries records
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true if the identity in use must be rotated
    pub fn requires_rotation(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Blocked)
    }

    /// Backoff class applied before the next attempt, if any
    pub fn backoff_class(&self) -> Option<BackoffClass> {
        match self {
            Self::RateLimited => Some(BackoffClass::RateLimited),
            Self::Blocked => Some(BackoffClass::Blocked),
            Self::TransientError(_) => Some(BackoffClass::Transient),
            Self::Success(_) | Self::NoDataYet | Self::InvalidTarget => None,
        }
    }

    /// Records carried by a successful outcome
    pub fn records(&self) -> &[StatRecord] {
        match self {
            Self::Success(records) => records,
            _ => &[],
        }
    }

    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::NoDataYet => "no_data_yet",
            Self::InvalidTarget => "invalid_target",
            Self::RateLimited => "rate_limited",
            Self::Blocked => "blocked",
            Self::TransientError(_) => "transient_error",
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(records) => write!(f, "success ({} records)", records.len()),
            Self::TransientError(detail) => write!(f, "transient_error: {}", detail),
            other => write!(f, "{}", other.label()),
        }
    }
}
