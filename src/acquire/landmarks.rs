//! Site landmarks
//!
//! A landmark is a structural signal on a page (heading, breadcrumb, table,
//! marker phrase) that tells the classifier what kind of page it is looking at
//! without understanding the page's content. Everything site-specific the
//! acquisition core needs lives behind [`LandmarkDetector`].

use crate::config::LandmarkConfig;
use crate::ConfigError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Per-site knowledge used to classify pages and locate the stats table
pub trait LandmarkDetector: Send + Sync {
    /// Whether the page identifies a real entity (section heading or breadcrumb)
    fn has_entity_context(&self, document: &Html) -> bool;

    /// Whether the page says the target does not exist
    ///
    /// `has_table` tells the detector whether a candidate table is present, so
    /// that free body text is only consulted on table-less pages.
    fn is_not_found(&self, document: &Html, has_table: bool) -> bool;

    /// Whether the page is a bot-detection or access-denied page
    ///
    /// Body text is only consulted on pages with neither a candidate table
    /// nor entity context; a challenge interstitial carries neither.
    fn is_block_page(&self, document: &Html, has_table: bool) -> bool;

    /// Tables that may hold the statistics, in document order
    fn candidate_tables<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;

    /// Whether a header names the entity identifier column
    fn is_identifier_header(&self, header: &str) -> bool;

    /// Season label shown on the page (e.g. "2025-26")
    fn season_label(&self, document: &Html) -> Option<String>;
}

/// Landmark detector driven by configured selectors and marker phrases
#[derive(Debug, Clone)]
pub struct MarkerLandmarks {
    context_keywords: Vec<String>,
    not_found_markers: Vec<String>,
    block_markers: Vec<String>,
    identifier_headers: Vec<String>,
    breadcrumb_min_links: usize,
    headings: Selector,
    breadcrumbs: Selector,
    tables: Selector,
    title: Selector,
    body: Selector,
    season: Regex,
}

fn parse_selector(name: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, selector, e)))
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Text of an element with whitespace collapsed, lowercased
fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl MarkerLandmarks {
    /// Compiles selectors and markers from configuration
    pub fn from_config(config: &LandmarkConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            context_keywords: lowercase_all(&config.context_keywords),
            not_found_markers: lowercase_all(&config.not_found_markers),
            block_markers: lowercase_all(&config.block_markers),
            identifier_headers: lowercase_all(&config.identifier_headers),
            breadcrumb_min_links: config.breadcrumb_min_links,
            headings: parse_selector("heading_selector", &config.heading_selector)?,
            breadcrumbs: parse_selector("breadcrumb_selector", &config.breadcrumb_selector)?,
            tables: parse_selector("table_selector", &config.table_selector)?,
            title: parse_selector("title", "title")?,
            body: parse_selector("body", "body")?,
            season: Regex::new(r"\b(\d{4}-\d{2})\b")
                .map_err(|e| ConfigError::Validation(e.to_string()))?,
        })
    }

    /// Lowercased title and heading texts
    fn prominent_texts(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.title)
            .chain(document.select(&self.headings))
            .map(normalized_text)
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn body_text(&self, document: &Html) -> String {
        document
            .select(&self.body)
            .next()
            .map(normalized_text)
            .unwrap_or_else(|| normalized_text(document.root_element()))
    }

    /// Matches markers in title and headings, and in body text when allowed
    fn matches_markers(&self, document: &Html, markers: &[String], search_body: bool) -> bool {
        if markers.is_empty() {
            return false;
        }

        let in_headings = self
            .prominent_texts(document)
            .iter()
            .any(|text| markers.iter().any(|m| text.contains(m.as_str())));
        if in_headings {
            return true;
        }

        if search_body {
            let body = self.body_text(document);
            return markers.iter().any(|m| body.contains(m.as_str()));
        }

        false
    }
}

impl LandmarkDetector for MarkerLandmarks {
    fn has_entity_context(&self, document: &Html) -> bool {
        let keyword_heading = self.prominent_texts(document).iter().any(|text| {
            self.context_keywords
                .iter()
                .any(|keyword| text.contains(keyword.as_str()))
        });
        if keyword_heading {
            return true;
        }

        self.breadcrumb_min_links > 0
            && document.select(&self.breadcrumbs).count() >= self.breadcrumb_min_links
    }

    fn is_not_found(&self, document: &Html, has_table: bool) -> bool {
        self.matches_markers(document, &self.not_found_markers, !has_table)
    }

    fn is_block_page(&self, document: &Html, has_table: bool) -> bool {
        let search_body = !has_table && !self.has_entity_context(document);
        self.matches_markers(document, &self.block_markers, search_body)
    }

    fn candidate_tables<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.tables).collect()
    }

    fn is_identifier_header(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.identifier_headers.iter().any(|h| *h == header)
    }

    fn season_label(&self, document: &Html) -> Option<String> {
        document
            .select(&self.title)
            .chain(document.select(&self.headings))
            .chain(document.select(&self.breadcrumbs))
            .find_map(|element| {
                let text = element.text().collect::<String>();
                self.season
                    .captures(&text)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            })
    }
}
