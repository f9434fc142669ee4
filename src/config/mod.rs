//! Configuration module for Stat-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use stat_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Fetching from: {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, FetchConfig, IdentityEntry, LandmarkConfig, PacingConfig, SiteConfig,
    TransportKind,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
