//! Stat-Scout: resilient acquisition of sports statistics tables
//!
//! This crate fetches statistics pages from third-party sites that expose no
//! stable API, classifies each page into a fixed set of outcomes, and parses
//! whatever statistics table it finds without sport-specific code.
//!
//! The single public operation is [`Orchestrator::fetch_entity_stats`], which
//! always returns a [`FetchResult`]; every page outcome (including blocks and
//! rate limits) is data, never an error.

pub mod acquire;
pub mod config;
pub mod logging;
pub mod output;
pub mod state;
pub mod transport;

use thiserror::Error;

/// Main error type for Stat-Scout operations
///
/// Only construction-time failures surface as errors. Page-level outcomes are
/// reported through [`FetchOutcome`].
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Stat-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

// Re-export commonly used types
pub use acquire::{Orchestrator, TableExtractor};
pub use config::Config;
pub use output::{FetchResult, StatFields, StatRecord};
pub use state::{FetchOutcome, RequestState};
pub use transport::{PageResponse, PageSource, TransportError};
