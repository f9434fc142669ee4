use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use stat_scout::config::load_config;
///
/// let config = load_config(Path::new("scout.toml")).unwrap();
/// println!("Max attempts: {}", config.fetch.max_attempts);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;

    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportKind;

    const MINIMAL: &str = r#"
[site]
name = "stats.ncaa.org"
base-url = "https://stats.ncaa.org"
path-template = "/teams/{target}/season_to_date_stats"
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = parse_config(MINIMAL).unwrap();

        assert_eq!(config.site.name, "stats.ncaa.org");
        assert_eq!(config.pacing.base_delay_ms, [3_000, 8_000]);
        assert_eq!(config.pacing.break_every, [8, 15]);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.transport, TransportKind::Http);
        assert!(config.browser.headless);
        assert!(config.identities.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[site]
name = "tfrrs"
base-url = "https://www.tfrrs.org"
path-template = "/teams/{target}.html"

[site.domain-hosts]
cross_country = "https://xc.tfrrs.org"

[pacing]
base-delay-ms = [4000, 8000]
break-every = [8, 12]
rate-limit-cap-secs = 600

[fetch]
transport = "browser"
timeout-ms = 30000
max-attempts = 4

[browser]
headless = false

[landmarks]
context-keywords = ["roster"]

[[identity]]
label = "chrome-mac"
user-agent = "Mozilla/5.0 (Macintosh) Chrome/120.0.0.0"

[[identity]]
label = "firefox-win"
user-agent = "Mozilla/5.0 (Windows NT 10.0) Firefox/121.0"
[identity.headers]
Accept-Language = "en-GB,en;q=0.8"
"#;

        let config = parse_config(content).unwrap();

        assert_eq!(
            config.site.domain_hosts.get("cross_country").map(String::as_str),
            Some("https://xc.tfrrs.org")
        );
        assert_eq!(config.pacing.break_every, [8, 12]);
        assert_eq!(config.pacing.rate_limit_cap_secs, 600);
        assert_eq!(config.pacing.blocked_cap_secs, 300);
        assert_eq!(config.fetch.transport, TransportKind::Browser);
        assert_eq!(config.fetch.max_attempts, 4);
        assert!(!config.browser.headless);
        assert_eq!(config.landmarks.context_keywords, vec!["roster"]);
        assert_eq!(config.identities.len(), 2);
        assert_eq!(
            config.identities[1].headers.get("Accept-Language").map(String::as_str),
            Some("en-GB,en;q=0.8")
        );
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_config("this is not valid TOML {{{");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_missing_site_section() {
        let result = parse_config("[fetch]\nmax-attempts = 2\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_runs_validation() {
        let content = format!("{MINIMAL}\n[fetch]\nmax-attempts = 0\n");
        let result = parse_config(&content);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/scout.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
