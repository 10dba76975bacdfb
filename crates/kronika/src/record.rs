// ABOUTME: ArticleRecord holding the normalized article produced by the extraction pipeline.
// ABOUTME: The source domain is always derived from the source URL and cannot be set on its own.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use url::Url;

/// A normalized article extracted from a publisher page.
///
/// Built once per extraction and never changed afterwards. `source_domain` is
/// computed from `source_url` by [`ArticleRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    title: String,
    content_html: Option<String>,
    content_text: Option<String>,
    published_at: Option<DateTime<Tz>>,
    source_url: String,
    source_domain: String,
}

impl ArticleRecord {
    /// Starts a record for `source_url`, which is kept exactly as given.
    pub fn new(
        source_url: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let source_url = source_url.into();
        let source_domain = source_domain(&source_url)?;
        Ok(Self {
            title: title.into(),
            content_html: None,
            content_text: None,
            published_at: None,
            source_url,
            source_domain,
        })
    }

    /// Sets the body fragment. Both values must come from the same element.
    pub fn with_content(mut self, html: Option<String>, text: Option<String>) -> Self {
        self.content_html = html;
        self.content_text = text;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Tz>>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content_html(&self) -> Option<&str> {
        self.content_html.as_deref()
    }

    pub fn content_text(&self) -> Option<&str> {
        self.content_text.as_deref()
    }

    pub fn published_at(&self) -> Option<&DateTime<Tz>> {
        self.published_at.as_ref()
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn source_domain(&self) -> &str {
        &self.source_domain
    }
}

/// Host of `url` with `:port` appended when the URL names a non-default port.
pub fn source_domain(url: &str) -> Result<String, url::ParseError> {
    let parsed = Url::parse(url)?;
    let host = parsed.host_str().ok_or(url::ParseError::EmptyHost)?;
    Ok(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
