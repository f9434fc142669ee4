//! Loading configuration files from disk

use stat_scout::config::{load_config, TransportKind};
use stat_scout::{ConfigError, Orchestrator, ScoutError};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_ncaa_config() {
    let file = write_config(
        r#"
[site]
name = "stats.ncaa.org"
base-url = "https://stats.ncaa.org"
path-template = "/teams/{target}/season_to_date_stats"

[pacing]
base-delay-ms = [4000, 8000]
break-every = [8, 12]
jitter-ratio = 0.2

[fetch]
timeout-ms = 30000
max-attempts = 4

[landmarks]
context-keywords = ["basketball", "season to date"]
breadcrumb-selector = "a.skipMask"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.site.name, "stats.ncaa.org");
    assert_eq!(config.pacing.base_delay_ms, [4_000, 8_000]);
    assert_eq!(config.pacing.jitter_ratio, 0.2);
    assert_eq!(config.pacing.rate_limit_cap_secs, 900);
    assert_eq!(config.fetch.transport, TransportKind::Http);
    assert_eq!(config.fetch.timeout_ms, 30_000);
    assert_eq!(config.fetch.max_attempts, 4);
    assert_eq!(config.landmarks.breadcrumb_selector, "a.skipMask");
    assert_eq!(config.landmarks.breadcrumb_min_links, 2);

    let orchestrator = Orchestrator::from_config(config).unwrap();
    assert!(orchestrator.request_state().is_first_request());
    assert_eq!(orchestrator.identity_rotations(), 0);
}

#[test]
fn test_load_browser_config_with_custom_identities() {
    let file = write_config(
        r#"
[site]
name = "tfrrs"
base-url = "https://www.tfrrs.org"
path-template = "/teams/{target}.html"

[site.domain-hosts]
cross_country = "https://xc.tfrrs.org"

[fetch]
transport = "browser"

[browser]
headless = false
settle-ms = [2000, 4000]
viewport-width = [1366, 1920]

[[identity]]
label = "chrome-macos"
user-agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) Chrome/120.0.0.0"

[[identity]]
label = "chrome-windows"
user-agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.fetch.transport, TransportKind::Browser);
    assert!(!config.browser.headless);
    assert_eq!(config.browser.viewport_width, [1366, 1920]);
    assert_eq!(config.identities.len(), 2);
    assert_eq!(config.identities[0].label, "chrome-macos");
}

#[test]
fn test_single_identity_pool_rejected() {
    let file = write_config(
        r#"
[site]
name = "s"
base-url = "https://example.com"
path-template = "/t/{target}"

[[identity]]
label = "lonely"
user-agent = "Mozilla/5.0"
"#,
    );

    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_malformed_file_rejected() {
    let file = write_config("[site\nname = ");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_bad_landmark_selector_rejected() {
    let file = write_config(
        r#"
[site]
name = "s"
base-url = "https://example.com"
path-template = "/t/{target}"

[landmarks]
table-selector = "table >"
"#,
    );

    let result = load_config(file.path());
    assert!(matches!(result, Err(ConfigError::InvalidSelector(_))));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));

    let error: ScoutError = result.unwrap_err().into();
    assert!(error.to_string().starts_with("Configuration error"));
}
