use crate::config::types::{
    BrowserConfig, Config, FetchConfig, IdentityEntry, LandmarkConfig, PacingConfig, SiteConfig,
};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_pacing_config(&config.pacing)?;
    validate_fetch_config(&config.fetch)?;
    validate_browser_config(&config.browser)?;
    validate_landmark_config(&config.landmarks)?;
    validate_identities(&config.identities)?;
    Ok(())
}

/// Validates the site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    validate_base_url(&config.base_url)?;

    if !config.path_template.contains("{target}") {
        return Err(ConfigError::Validation(format!(
            "path_template must contain '{{target}}', got '{}'",
            config.path_template
        )));
    }

    for (hint, host) in &config.domain_hosts {
        validate_base_url(host).map_err(|e| {
            ConfigError::InvalidUrl(format!("domain host for '{}': {}", hint, e))
        })?;
    }

    Ok(())
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            raw
        )));
    }

    Ok(())
}

/// Validates pacing configuration
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_range("base_delay_ms", config.base_delay_ms)?;
    validate_range("break_duration_ms", config.break_duration_ms)?;
    validate_range("break_every", config.break_every)?;

    if config.break_every[0] < 1 {
        return Err(ConfigError::Validation(
            "break_every must be >= 1 request".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.jitter_ratio) {
        return Err(ConfigError::Validation(format!(
            "jitter_ratio must be between 0 and 1, got {}",
            config.jitter_ratio
        )));
    }

    if config.transient_cap_secs == 0
        || config.blocked_cap_secs == 0
        || config.rate_limit_cap_secs == 0
    {
        return Err(ConfigError::Validation(
            "backoff caps must be > 0 seconds".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    validate_range("viewport_width", config.viewport_width)?;
    validate_range("viewport_height", config.viewport_height)?;
    validate_range("settle_ms", config.settle_ms)?;

    if config.viewport_width[0] < 320 || config.viewport_height[0] < 240 {
        return Err(ConfigError::Validation(format!(
            "viewport band too small: {:?} x {:?}",
            config.viewport_width, config.viewport_height
        )));
    }

    Ok(())
}

/// Validates landmark configuration, including that every selector parses
fn validate_landmark_config(config: &LandmarkConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("heading_selector", &config.heading_selector),
        ("breadcrumb_selector", &config.breadcrumb_selector),
        ("table_selector", &config.table_selector),
    ] {
        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, selector, e))
        })?;
    }

    if config.context_keywords.iter().all(|k| k.trim().is_empty())
        && config.breadcrumb_min_links == 0
    {
        return Err(ConfigError::Validation(
            "landmarks need context_keywords or a breadcrumb_min_links > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates a custom identity pool
///
/// An empty pool selects the built-in identities. A custom pool needs at
/// least two entries so rotation can always pick a different identity.
fn validate_identities(identities: &[IdentityEntry]) -> Result<(), ConfigError> {
    if identities.is_empty() {
        return Ok(());
    }

    if identities.len() < 2 {
        return Err(ConfigError::Validation(
            "identity pool must contain at least two entries".to_string(),
        ));
    }

    let mut labels = HashSet::new();
    for entry in identities {
        if entry.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "identity '{}' has an empty user_agent",
                entry.label
            )));
        }

        if !labels.insert(entry.label.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate identity label '{}'",
                entry.label
            )));
        }
    }

    Ok(())
}

/// Checks that a `[min, max]` pair is ordered
fn validate_range<T: PartialOrd + std::fmt::Debug>(
    name: &str,
    range: [T; 2],
) -> Result<(), ConfigError> {
    if range[0] > range[1] {
        return Err(ConfigError::Validation(format!(
            "{} range is inverted: {:?}",
            name, range
        )));
    }
    Ok(())
}
