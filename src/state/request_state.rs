use std::time::{Duration, Instant};

/// Severity class of the most recent failure, used to pick a backoff cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackoffClass {
    /// Network failure, timeout or server error
    Transient,
    /// Hard block (HTTP 403 or a block page)
    Blocked,
    /// Rate-limit signal (HTTP 429)
    RateLimited,
}

/// Tracks pacing state for one orchestrator
///
/// A `RequestState` is owned by exactly one orchestrator and is deliberately
/// neither `Clone` nor internally synchronised: every mutation goes through
/// `&mut self`, so two callers can never drive the same counters.
#[derive(Debug, Default)]
pub struct RequestState {
    /// Failed attempts since the last success
    pub consecutive_error_count: u32,

    /// Requests issued since the last extended break
    pub requests_since_last_break: u32,

    /// When the previous request was issued
    pub last_request_timestamp: Option<Instant>,

    /// Class of the most recent failure, cleared on success
    pub last_failure: Option<BackoffClass>,
}

impl RequestState {
    /// Creates a new RequestState with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a request was issued at `now`
    pub fn mark_request(&mut self, now: Instant) {
        self.last_request_timestamp = Some(now);
    }

    /// Records a successful attempt, resetting the error streak
    pub fn record_success(&mut self) {
        self.consecutive_error_count = 0;
        self.last_failure = None;
    }

    /// Records a failed attempt of the given class
    pub fn record_failure(&mut self, class: BackoffClass) {
        self.consecutive_error_count = self.consecutive_error_count.saturating_add(1);
        self.last_failure = Some(class);
    }

    /// Returns true if no request has been issued yet
    pub fn is_first_request(&self) -> bool {
        self.last_request_timestamp.is_none()
    }

    /// Time elapsed since the previous request, if there was one
    pub fn since_last_request(&self, now: Instant) -> Option<Duration> {
        self.last_request_timestamp
            .map(|last| now.saturating_duration_since(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_state() {
        let state = RequestState::new();
        assert_eq!(state.consecutive_error_count, 0);
        assert_eq!(state.requests_since_last_break, 0);
        assert!(state.last_request_timestamp.is_none());
        assert!(state.last_failure.is_none());
        assert!(state.is_first_request());
    }

    #[test]
    fn test_record_failure_and_success() {
        let mut state = RequestState::new();

        state.record_failure(BackoffClass::Blocked);
        state.record_failure(BackoffClass::RateLimited);
        assert_eq!(state.consecutive_error_count, 2);
        assert_eq!(state.last_failure, Some(BackoffClass::RateLimited));

        state.record_success();
        assert_eq!(state.consecutive_error_count, 0);
        assert!(state.last_failure.is_none());
    }

    #[test]
    fn test_since_last_request() {
        let mut state = RequestState::new();
        let now = Instant::now();

        assert!(state.since_last_request(now).is_none());

        state.mark_request(now);
        assert!(!state.is_first_request());

        let later = now + Duration::from_millis(1500);
        assert_eq!(
            state.since_last_request(later),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_error_count_saturates() {
        let mut state = RequestState::new();
        state.consecutive_error_count = u32::MAX;
        state.record_failure(BackoffClass::Transient);
        assert_eq!(state.consecutive_error_count, u32::MAX);
    }
}
