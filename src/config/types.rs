use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Stat-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub landmarks: LandmarkConfig,
    /// Custom identity pool; the built-in pool is used when empty
    #[serde(default, rename = "identity")]
    pub identities: Vec<IdentityEntry>,
}

impl Config {
    /// Builds a configuration for `base_url` with every other section defaulted
    pub fn for_site(name: &str, base_url: &str, path_template: &str) -> Self {
        Self {
            site: SiteConfig {
                name: name.to_string(),
                base_url: base_url.to_string(),
                path_template: path_template.to_string(),
                domain_hosts: BTreeMap::new(),
            },
            pacing: PacingConfig::default(),
            fetch: FetchConfig::default(),
            browser: BrowserConfig::default(),
            landmarks: LandmarkConfig::default(),
            identities: Vec::new(),
        }
    }
}

/// The target site and how target ids map onto its URLs
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Source name reported in every `FetchResult`
    pub name: String,

    /// Base URL of the target site (e.g. "https://stats.ncaa.org")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path appended to the base URL; `{target}` is replaced by the target id
    #[serde(rename = "path-template")]
    pub path_template: String,

    /// Alternative base URLs selected by domain hint
    #[serde(default, rename = "domain-hosts")]
    pub domain_hosts: BTreeMap<String, String>,
}

/// Request cadence and backoff tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Uniform range for the per-request base delay (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: [u64; 2],

    /// Range from which the extended-break interval K is drawn (requests)
    #[serde(rename = "break-every")]
    pub break_every: [u32; 2],

    /// Uniform range for the extended break itself (milliseconds)
    #[serde(rename = "break-duration-ms")]
    pub break_duration_ms: [u64; 2],

    /// Unit of the exponential backoff term (unit * 2^errors)
    #[serde(rename = "backoff-unit-ms")]
    pub backoff_unit_ms: u64,

    /// Upper bound of the jitter, as a fraction of the backoff term
    #[serde(rename = "jitter-ratio")]
    pub jitter_ratio: f64,

    /// Backoff cap after network failures and server errors
    #[serde(rename = "transient-cap-secs")]
    pub transient_cap_secs: u64,

    /// Backoff cap after a hard block (HTTP 403 / block page)
    #[serde(rename = "blocked-cap-secs")]
    pub blocked_cap_secs: u64,

    /// Backoff cap after a rate-limit signal (HTTP 429)
    #[serde(rename = "rate-limit-cap-secs")]
    pub rate_limit_cap_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: [3_000, 8_000],
            break_every: [8, 15],
            break_duration_ms: [20_000, 40_000],
            backoff_unit_ms: 1_000,
            jitter_ratio: 0.3,
            transient_cap_secs: 60,
            blocked_cap_secs: 300,
            rate_limit_cap_secs: 900,
        }
    }
}

/// Which page source drives the fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Plain HTTP client for statically served HTML
    Http,
    /// Full browser engine for JavaScript-rendered pages
    Browser,
}

/// Per-attempt fetch behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub transport: TransportKind,

    /// Timeout for one page-retrieval attempt (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// TCP connect timeout for the HTTP transport (milliseconds)
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    /// Attempts per call, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Http,
            timeout_ms: 20_000,
            connect_timeout_ms: 10_000,
            max_attempts: 3,
        }
    }
}

/// Browser transport settings (ignored by the HTTP transport)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    #[serde(rename = "executable-path")]
    pub executable_path: Option<String>,

    #[serde(rename = "no-sandbox")]
    pub no_sandbox: bool,

    /// Band the randomised viewport width is drawn from
    #[serde(rename = "viewport-width")]
    pub viewport_width: [u32; 2],

    /// Band the randomised viewport height is drawn from
    #[serde(rename = "viewport-height")]
    pub viewport_height: [u32; 2],

    /// Wait after navigation for client-side rendering (milliseconds)
    #[serde(rename = "settle-ms")]
    pub settle_ms: [u64; 2],
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable_path: None,
            no_sandbox: true,
            viewport_width: [1280, 1920],
            viewport_height: [720, 1080],
            settle_ms: [2_000, 4_000],
        }
    }
}

/// Site landmarks used to classify pages and find the stats table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// Keywords whose presence in a heading marks a valid entity page
    #[serde(rename = "context-keywords")]
    pub context_keywords: Vec<String>,

    /// Elements inspected for context keywords and not-found markers
    #[serde(rename = "heading-selector")]
    pub heading_selector: String,

    /// Navigational breadcrumb links
    #[serde(rename = "breadcrumb-selector")]
    pub breadcrumb_selector: String,

    /// Breadcrumb links needed to count as entity context
    #[serde(rename = "breadcrumb-min-links")]
    pub breadcrumb_min_links: usize,

    /// Phrases identifying a missing page
    #[serde(rename = "not-found-markers")]
    pub not_found_markers: Vec<String>,

    /// Phrases identifying a bot-detection or access-denied page
    #[serde(rename = "block-markers")]
    pub block_markers: Vec<String>,

    /// Candidate statistics tables
    #[serde(rename = "table-selector")]
    pub table_selector: String,

    /// Header texts that name the identifier column when no cell links exist
    #[serde(rename = "identifier-headers")]
    pub identifier_headers: Vec<String>,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        fn strings(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }

        Self {
            context_keywords: strings(&[
                "basketball",
                "soccer",
                "lacrosse",
                "baseball",
                "softball",
                "field hockey",
                "volleyball",
                "cross country",
                "track",
                "squash",
                "cricket",
                "season to date",
                "statistics",
                "roster",
            ]),
            heading_selector: "h1, h2, h3, h4, .card-header".to_string(),
            breadcrumb_selector:
                "a.skipMask, .breadcrumb a, nav[aria-label='breadcrumb'] a".to_string(),
            breadcrumb_min_links: 2,
            not_found_markers: strings(&[
                "page not found",
                "404",
                "no team found",
                "not found",
                "does not exist",
            ]),
            block_markers: strings(&[
                "access denied",
                "captcha",
                "verify you are human",
                "are you a robot",
                "unusual traffic",
                "attention required",
                "just a moment...",
                "request unsuccessful",
                "you have been blocked",
            ]),
            table_selector: "table".to_string(),
            identifier_headers: strings(&["player", "name", "athlete", "team", "school"]),
        }
    }
}

/// One client identity in a custom pool
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityEntry {
    /// Short name used in logs (e.g. "chrome-macos")
    pub label: String,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Extra request headers sent with this identity
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}
