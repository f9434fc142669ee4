//! Pacing controller: inter-request delays, backoff and extended breaks
//!
//! The controller only computes durations. It never sleeps and never decides
//! whether a retry happens; the orchestrator does both.

use crate::config::PacingConfig;
use crate::state::{BackoffClass, RequestState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Breakdown of one computed delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPlan {
    /// Uniformly drawn human-cadence delay
    pub base: Duration,

    /// Exponential backoff term (zero without recent errors)
    pub backoff: Duration,

    /// Random extra on top of the backoff term
    pub jitter: Duration,

    /// Extended break forced by the request cadence, if due
    pub extended_break: Option<Duration>,
}

impl PacingPlan {
    /// Total time to wait before the next request
    pub fn total(&self) -> Duration {
        self.base + self.backoff + self.jitter + self.extended_break.unwrap_or(Duration::ZERO)
    }
}

/// Computes the wait before each request
#[derive(Debug)]
pub struct PacingController {
    config: PacingConfig,
    rng: StdRng,
    /// Requests between extended breaks, redrawn after every break
    break_threshold: u32,
}

impl PacingController {
    /// Creates a controller seeded from system entropy
    pub fn new(config: PacingConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a controller with a fixed seed, for reproducible runs
    pub fn with_seed(config: PacingConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: PacingConfig, mut rng: StdRng) -> Self {
        let break_threshold = draw_threshold(&config, &mut rng);
        Self {
            config,
            rng,
            break_threshold,
        }
    }

    /// Returns the wait before the next request and advances the break counter
    pub fn next_delay(&mut self, state: &mut RequestState) -> Duration {
        self.plan(state).total()
    }

    /// Computes the full delay breakdown for the next request
    ///
    /// Increments `requests_since_last_break`; when the counter reaches the
    /// current threshold an extended break is added, the counter resets and a
    /// new threshold is drawn.
    pub fn plan(&mut self, state: &mut RequestState) -> PacingPlan {
        let [base_min, base_max] = self.config.base_delay_ms;
        let base = Duration::from_millis(self.rng.gen_range(base_min..=base_max));

        let class = state.last_failure.unwrap_or(BackoffClass::Transient);
        let backoff = self.backoff_term(state.consecutive_error_count, class);
        let jitter = if backoff.is_zero() {
            Duration::ZERO
        } else {
            backoff.mul_f64(self.rng.gen_range(0.0..=self.config.jitter_ratio))
        };

        state.requests_since_last_break = state.requests_since_last_break.saturating_add(1);
        let extended_break = if state.requests_since_last_break >= self.break_threshold {
            let [pause_min, pause_max] = self.config.break_duration_ms;
            let pause = Duration::from_millis(self.rng.gen_range(pause_min..=pause_max));
            tracing::info!(
                after_requests = state.requests_since_last_break,
                pause_ms = pause.as_millis() as u64,
                "Taking extended break"
            );
            state.requests_since_last_break = 0;
            self.break_threshold = draw_threshold(&self.config, &mut self.rng);
            Some(pause)
        } else {
            None
        };

        let plan = PacingPlan {
            base,
            backoff,
            jitter,
            extended_break,
        };

        if state.consecutive_error_count > 0 {
            tracing::info!(
                errors = state.consecutive_error_count,
                class = ?class,
                delay_ms = plan.total().as_millis() as u64,
                "Exponential backoff"
            );
        } else {
            tracing::debug!(delay_ms = plan.total().as_millis() as u64, "Pacing delay");
        }

        plan
    }

    /// Backoff term for `errors` consecutive failures: `unit * 2^errors`, capped
    ///
    /// Monotonically non-decreasing in `errors` and never above the class cap.
    pub fn backoff_term(&self, errors: u32, class: BackoffClass) -> Duration {
        if errors == 0 {
            return Duration::ZERO;
        }

        let factor = 2u64.checked_pow(errors).unwrap_or(u64::MAX);
        let uncapped = Duration::from_millis(self.config.backoff_unit_ms.saturating_mul(factor));
        uncapped.min(self.cap_for(class))
    }

    /// Backoff cap for a failure class
    pub fn cap_for(&self, class: BackoffClass) -> Duration {
        let secs = match class {
            BackoffClass::Transient => self.config.transient_cap_secs,
            BackoffClass::Blocked => self.config.blocked_cap_secs,
            BackoffClass::RateLimited => self.config.rate_limit_cap_secs,
        };
        Duration::from_secs(secs)
    }

    /// Upper bound of backoff plus jitter for a failure class
    pub fn max_backoff_with_jitter(&self, class: BackoffClass) -> Duration {
        let cap = self.cap_for(class);
        cap + cap.mul_f64(self.config.jitter_ratio)
    }

    /// Requests remaining until the next extended break
    pub fn requests_until_break(&self, state: &RequestState) -> u32 {
        self.break_threshold
            .saturating_sub(state.requests_since_last_break)
    }
}

fn draw_threshold(config: &PacingConfig, rng: &mut StdRng) -> u32 {
    let [min, max] = config.break_every;
    rng.gen_range(min.max(1)..=max.max(1))
}
