// ABOUTME: Page-fetching collaborator traits used by the extraction pipeline.
// ABOUTME: Defines PageFetcher/PageSession plus an in-memory StaticFetcher for offline HTML.

//! Page fetching.
//!
//! A [`PageFetcher`] opens one [`PageSession`] per extraction. The session
//! navigates, optionally waits for readiness selectors and lazy-loads, then
//! hands back the rendered HTML. The pipeline always calls
//! [`PageSession::close`] before returning.

pub mod http;
#[cfg(feature = "webdriver")]
pub mod webdriver;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExtractError;

pub use http::{HttpFetcher, HttpFetcherBuilder};
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverFetcher;

/// Outcome of navigating a session to a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The server answered with this status.
    Response { status: u16 },
    /// The page loaded but the backend does not report a status.
    Loaded,
    /// Nothing came back for the URL.
    NoResponse,
}

impl Navigation {
    /// Status of 400 or above.
    pub fn is_http_error(&self) -> bool {
        matches!(self, Navigation::Response { status } if *status >= 400)
    }
}

/// Opens independent page sessions.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageSession>, ExtractError>;
}

/// One page load. Resources are released by [`PageSession::close`].
#[async_trait]
pub trait PageSession: Send {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<Navigation, ExtractError>;

    /// Waits until any of `selectors` matches. Expiry is reported as a Timeout error.
    async fn wait_for_selector(
        &mut self,
        selectors: &[String],
        timeout: Duration,
    ) -> Result<(), ExtractError>;

    /// Scrolls to trigger lazily loaded content. Backends without a renderer do nothing.
    async fn lazy_load(&mut self, _passes: u32) -> Result<(), ExtractError> {
        Ok(())
    }

    /// The current document HTML. Empty when nothing was loaded.
    async fn content(&mut self) -> Result<String, ExtractError>;

    async fn close(&mut self) -> Result<(), ExtractError>;
}

/// Serves one fixed HTML document for every URL.
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    html: String,
    status: u16,
}

impl StaticFetcher {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            status: 200,
        }
    }

    /// Reports `status` from every navigation.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn open(&self) -> Result<Box<dyn PageSession>, ExtractError> {
        Ok(Box::new(StaticSession {
            html: self.html.clone(),
            status: self.status,
            loaded: false,
        }))
    }
}

struct StaticSession {
    html: String,
    status: u16,
    loaded: bool,
}

#[async_trait]
impl PageSession for StaticSession {
    async fn goto(&mut self, _url: &str, _timeout: Duration) -> Result<Navigation, ExtractError> {
        self.loaded = true;
        Ok(Navigation::Response {
            status: self.status,
        })
    }

    async fn wait_for_selector(
        &mut self,
        selectors: &[String],
        _timeout: Duration,
    ) -> Result<(), ExtractError> {
        if contains_any(&self.html, selectors) {
            Ok(())
        } else {
            Err(ExtractError::timeout(
                "",
                "WaitForSelector",
                Some(anyhow::anyhow!("none of {:?} appeared", selectors)),
            ))
        }
    }

    async fn content(&mut self) -> Result<String, ExtractError> {
        if self.loaded {
            Ok(self.html.clone())
        } else {
            Ok(String::new())
        }
    }

    async fn close(&mut self) -> Result<(), ExtractError> {
        self.loaded = false;
        Ok(())
    }
}

/// Reports whether any selector matches in `html`. An empty list always matches.
pub(crate) fn contains_any(html: &str, selectors: &[String]) -> bool {
    if selectors.is_empty() {
        return true;
    }
    let doc = scraper::Html::parse_document(html);
    selectors.iter().any(|s| {
        scraper::Selector::parse(s)
            .map(|sel| doc.select(&sel).next().is_some())
            .unwrap_or(false)
    })
}
