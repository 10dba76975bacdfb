// ABOUTME: Content extraction strategies: the ContentExtraction trait and the closed Strategy enum.
// ABOUTME: Per-domain variants use fixed selectors; the generic variant relies on markup heuristics.

//! Content extraction module.
//!
//! Every strategy answers the same four questions about a [`LoadedPage`]:
//! title, body HTML, body text and the raw publish date. Answers are
//! independent and a miss is logged, never raised.
//!
//! Submodules:
//! - `fields`: selector helpers shared by all strategies.
//! - `site`: selector tables for the known publisher domains.
//! - `generic`: fallback heuristics for unknown markup.

pub mod fields;
pub mod generic;
pub mod site;

use scraper::Html;
use tracing::{debug, warn};

pub use generic::GenericStrategy;
pub use site::SiteSelectors;

/// A rendered page ready for extraction.
pub struct LoadedPage {
    url: String,
    document: Html,
}

impl LoadedPage {
    pub fn new(url: impl Into<String>, document: Html) -> Self {
        Self {
            url: url.into(),
            document,
        }
    }

    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self::new(url, Html::parse_document(html))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }
}

/// Publish date texts found on a page, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateCandidates(Vec<String>);

impl DateCandidates {
    pub fn new(candidates: Vec<String>) -> Self {
        Self(candidates)
    }

    /// The candidate the normalizer consumes.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Option<String>> for DateCandidates {
    fn from(value: Option<String>) -> Self {
        Self(value.into_iter().collect())
    }
}

/// The four field extractors every strategy provides.
pub trait ContentExtraction {
    fn extract_title(&self, page: &LoadedPage) -> Option<String>;

    fn extract_content_html(&self, page: &LoadedPage) -> Option<String>;

    fn extract_content_text(&self, page: &LoadedPage) -> Option<String>;

    fn published_candidates(&self, page: &LoadedPage) -> DateCandidates;

    /// The highest priority publish date text.
    fn extract_published_raw(&self, page: &LoadedPage) -> Option<String> {
        let candidates = self.published_candidates(page);
        if candidates.len() > 1 {
            debug!(url = page.url(), candidates = ?candidates.as_slice(), "date candidates");
        }
        candidates.first().map(str::to_string)
    }
}

/// Extraction strategy selected per domain.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// take-group.github.io
    TakeGroup,
    /// galicjaexpress.pl
    GalicjaExpress,
    Generic(GenericStrategy),
}

impl Strategy {
    pub fn generic() -> Self {
        Strategy::Generic(GenericStrategy)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::TakeGroup => "take-group",
            Strategy::GalicjaExpress => "galicjaexpress",
            Strategy::Generic(_) => "generic",
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Strategy::Generic(_))
    }

    fn inner(&self) -> &dyn ContentExtraction {
        match self {
            Strategy::TakeGroup => &site::TAKE_GROUP,
            Strategy::GalicjaExpress => &site::GALICJA_EXPRESS,
            Strategy::Generic(generic) => generic,
        }
    }
}

impl ContentExtraction for Strategy {
    fn extract_title(&self, page: &LoadedPage) -> Option<String> {
        log_miss(page, "title", self.inner().extract_title(page))
    }

    fn extract_content_html(&self, page: &LoadedPage) -> Option<String> {
        log_miss(page, "content_html", self.inner().extract_content_html(page))
    }

    fn extract_content_text(&self, page: &LoadedPage) -> Option<String> {
        log_miss(page, "content_text", self.inner().extract_content_text(page))
    }

    fn published_candidates(&self, page: &LoadedPage) -> DateCandidates {
        let found = self.inner().published_candidates(page);
        if found.is_empty() {
            warn!(url = page.url(), field = "published", "field not found");
        }
        found
    }
}

fn log_miss(page: &LoadedPage, field: &'static str, found: Option<String>) -> Option<String> {
    if found.is_none() {
        warn!(url = page.url(), field, "field not found");
    }
    found
}
