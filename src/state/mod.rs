//! State module for tracking acquisition progress
//!
//! # Components
//!
//! - `FetchOutcome`: the classified result of one fetch attempt
//! - `RequestState`: per-orchestrator pacing and backoff counters

mod outcome;
mod request_state;

// Re-export main types
pub use outcome::FetchOutcome;
pub use request_state::{BackoffClass, RequestState};
