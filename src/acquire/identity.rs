//! Client identities and their rotation
//!
//! An identity is the user agent and header set presented to the target site.
//! The manager holds one current identity and replaces it wholesale on
//! `rotate`; identities are never mutated in place. Each rotation opens a new
//! session id, which transports use to drop cookies and browser state.

use crate::config::{BrowserConfig, IdentityEntry};
use crate::ConfigError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// The identity presented for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Short name used in logs
    pub label: String,

    pub user_agent: String,

    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// Session this identity belongs to; changes on every rotation
    pub session: u64,
}

impl Identity {
    /// Languages advertised by the `Accept-Language` header, most preferred first
    pub fn languages(&self) -> Vec<String> {
        let header = self
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("accept-language"))
            .map(|(_, value)| value.as_str())
            .unwrap_or("en-US,en;q=0.9");

        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
            .collect()
    }
}

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// (label, user agent, accept-language)
const BUILTIN_IDENTITIES: &[(&str, &str, &str)] = &[
    (
        "chrome-macos",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "en-US,en;q=0.9",
    ),
    (
        "chrome-windows",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "en-US,en;q=0.9",
    ),
    (
        "edge-windows",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36 Edg/121.0.0.0",
        "en-US,en;q=0.9",
    ),
    (
        "firefox-windows",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
        "en-US,en;q=0.5",
    ),
    (
        "safari-macos",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
        "en-US,en;q=0.9",
    ),
    (
        "chrome-linux",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "en-US,en;q=0.8",
    ),
];

/// The built-in identity pool
pub fn builtin_pool() -> Vec<IdentityEntry> {
    BUILTIN_IDENTITIES
        .iter()
        .map(|(label, user_agent, language)| {
            let mut headers = BTreeMap::new();
            headers.insert("Accept".to_string(), ACCEPT_HTML.to_string());
            headers.insert("Accept-Language".to_string(), language.to_string());
            headers.insert("Upgrade-Insecure-Requests".to_string(), "1".to_string());

            IdentityEntry {
                label: label.to_string(),
                user_agent: user_agent.to_string(),
                headers,
            }
        })
        .collect()
}

/// Owns the identity pool and the single current identity
#[derive(Debug)]
pub struct IdentityManager {
    pool: Vec<IdentityEntry>,
    index: usize,
    current: Identity,
    rotations: u32,
    rng: StdRng,
}

impl IdentityManager {
    /// Creates a manager over `pool`, starting on a random entry
    ///
    /// An empty pool selects the built-in identities. A pool of one entry is
    /// rejected: rotation must always be able to pick a different identity.
    pub fn new(pool: Vec<IdentityEntry>) -> Result<Self, ConfigError> {
        Self::with_rng(pool, StdRng::from_entropy())
    }

    /// Same as [`IdentityManager::new`] with a fixed seed
    pub fn with_seed(pool: Vec<IdentityEntry>, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(pool, StdRng::seed_from_u64(seed))
    }

    /// Manager over the built-in pool
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::with_rng(builtin_pool(), StdRng::from_entropy())
    }

    fn with_rng(pool: Vec<IdentityEntry>, mut rng: StdRng) -> Result<Self, ConfigError> {
        let pool = if pool.is_empty() { builtin_pool() } else { pool };

        if pool.len() < 2 {
            return Err(ConfigError::Validation(
                "identity pool must contain at least two entries".to_string(),
            ));
        }

        let index = rng.gen_range(0..pool.len());
        let current = materialize(&pool[index], 0);

        Ok(Self {
            pool,
            index,
            current,
            rotations: 0,
            rng,
        })
    }

    /// The identity to use for the next request
    pub fn current_identity(&self) -> &Identity {
        &self.current
    }

    /// Replaces the current identity with a different pool entry
    ///
    /// The new identity always differs from the one it replaces and carries a
    /// fresh session id.
    pub fn rotate(&mut self) -> &Identity {
        let previous = self.index;
        let mut next = self.rng.gen_range(0..self.pool.len() - 1);
        if next >= previous {
            next += 1;
        }

        self.index = next;
        self.rotations = self.rotations.saturating_add(1);
        self.current = materialize(&self.pool[next], u64::from(self.rotations));

        tracing::info!(
            from = %self.pool[previous].label,
            to = %self.current.label,
            rotations = self.rotations,
            "Rotated identity"
        );

        &self.current
    }

    /// Rotations performed so far
    pub fn rotations(&self) -> u32 {
        self.rotations
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}

fn materialize(entry: &IdentityEntry, session: u64) -> Identity {
    Identity {
        label: entry.label.clone(),
        user_agent: entry.user_agent.clone(),
        headers: entry.headers.clone(),
        session,
    }
}

/// Anti-automation settings for a browser session presenting an identity
#[derive(Debug, Clone, PartialEq)]
pub struct StealthDirectives {
    /// Extra browser launch arguments
    pub launch_args: Vec<String>,

    /// Scripts evaluated before any page script runs
    pub init_scripts: Vec<String>,

    pub viewport_width: u32,
    pub viewport_height: u32,
}

/// Builds the fingerprint-scrubbing directives for a browser session
///
/// Hides `navigator.webdriver`, presents a non-empty plugin list, aligns
/// `navigator.languages` with the identity's `Accept-Language` and draws a
/// viewport from the configured band.
pub fn browser_directives<R: Rng>(
    identity: &Identity,
    config: &BrowserConfig,
    rng: &mut R,
) -> StealthDirectives {
    let viewport_width = rng.gen_range(config.viewport_width[0]..=config.viewport_width[1]);
    let viewport_height = rng.gen_range(config.viewport_height[0]..=config.viewport_height[1]);

    let mut launch_args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-first-run".to_string(),
        format!("--user-agent={}", identity.user_agent),
        format!("--window-size={},{}", viewport_width, viewport_height),
    ];
    if let Some(primary) = identity.languages().first() {
        launch_args.push(format!("--lang={}", primary));
    }

    let languages = identity
        .languages()
        .iter()
        .map(|lang| format!("'{}'", lang.replace('\'', "")))
        .collect::<Vec<_>>()
        .join(", ");

    let init_scripts = vec![
        "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });".to_string(),
        "Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });".to_string(),
        format!(
            "Object.defineProperty(navigator, 'languages', {{ get: () => [{}] }});",
            languages
        ),
    ];

    StealthDirectives {
        launch_args,
        init_scripts,
        viewport_width,
        viewport_height,
    }
}
