// ABOUTME: The ExtractionPipeline: fetch a rendered page, pick a strategy, extract and normalize fields.
// ABOUTME: Each call owns one page session and closes it on every exit path, panics included.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use kronika_dates::DateNormalizer;
use tracing::{debug, error, info, warn};

use crate::error::ExtractError;
use crate::extractors::{ContentExtraction, LoadedPage, Strategy};
use crate::fetch::{Navigation, PageFetcher, PageSession};
use crate::options::{FetchFailurePolicy, Options, PipelineBuilder, UnknownDomainPolicy};
use crate::record::{source_domain, ArticleRecord};
use crate::registry::StrategyRegistry;

/// Turns publisher URLs into [`ArticleRecord`]s.
///
/// Holds no mutable state; one pipeline can serve many URLs concurrently as
/// long as the fetcher supports independent sessions.
pub struct ExtractionPipeline {
    opts: Options,
    registry: Arc<StrategyRegistry>,
    fetcher: Arc<dyn PageFetcher>,
    normalizer: DateNormalizer,
}

impl ExtractionPipeline {
    pub(crate) fn new(
        opts: Options,
        registry: Arc<StrategyRegistry>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let normalizer = DateNormalizer::new(opts.zone);
        Self {
            opts,
            registry,
            fetcher,
            normalizer,
        }
    }

    /// Create a new PipelineBuilder for custom configuration.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Extracts the article at `url`, logging and swallowing every failure.
    ///
    /// Returns `None` when no article body could be located or when the URL
    /// could not be processed at all. Calling it again repeats the same work
    /// with no side effects.
    pub async fn extract(&self, url: &str) -> Option<ArticleRecord> {
        match self.try_extract(url).await {
            Ok(record) => Some(record),
            Err(err) => {
                error!(url, code = %err.code, error = %err, "extraction failed");
                None
            }
        }
    }

    /// Extracts the article at `url`, reporting why it failed.
    pub async fn try_extract(&self, url: &str) -> Result<ArticleRecord, ExtractError> {
        source_domain(url).map_err(|e| {
            ExtractError::invalid_url(url, "Extract", Some(anyhow::anyhow!("{}", e)))
        })?;
        let strategy = self.strategy_for(url)?;

        let mut session = self.fetcher.open().await?;
        let outcome = AssertUnwindSafe(self.run(session.as_mut(), url, strategy))
            .catch_unwind()
            .await;
        if let Err(err) = session.close().await {
            warn!(url, error = %err, "failed to close page session");
        }

        match outcome {
            Ok(result) => result,
            Err(panic) => Err(ExtractError::session(
                url,
                "Extract",
                Some(anyhow::anyhow!("extraction panicked: {}", panic_message(&*panic))),
            )),
        }
    }

    fn strategy_for(&self, url: &str) -> Result<&Strategy, ExtractError> {
        if let Some(strategy) = self.registry.find(url) {
            return Ok(strategy);
        }
        match self.opts.unknown_domain {
            UnknownDomainPolicy::Fallback => Ok(self.registry.resolve(url)),
            UnknownDomainPolicy::Reject => {
                warn!(url, "no scraper for domain");
                Err(ExtractError::unknown_domain(url, "Resolve"))
            }
        }
    }

    async fn run(
        &self,
        session: &mut dyn PageSession,
        url: &str,
        strategy: &Strategy,
    ) -> Result<ArticleRecord, ExtractError> {
        let html = self.load(session, url).await?;
        self.assemble(url, &html, strategy)
    }

    /// Navigates and waits for the page, applying the fetch failure policy.
    async fn load(&self, session: &mut dyn PageSession, url: &str) -> Result<String, ExtractError> {
        match session.goto(url, self.opts.navigation_timeout).await? {
            Navigation::NoResponse => {
                error!(url, "no response from server");
                self.on_fetch_failure(ExtractError::fetch(
                    url,
                    "Goto",
                    Some(anyhow::anyhow!("no response")),
                ))?;
            }
            Navigation::Response { status } if status >= 400 => {
                error!(url, status, "HTTP error");
                self.on_fetch_failure(ExtractError::fetch(
                    url,
                    "Goto",
                    Some(anyhow::anyhow!("HTTP status {}", status)),
                ))?;
            }
            nav => debug!(url, ?nav, "page loaded"),
        }

        if !self.opts.ready_selectors.is_empty() {
            let waited = session
                .wait_for_selector(&self.opts.ready_selectors, self.opts.selector_timeout)
                .await;
            if let Err(err) = waited {
                if !err.is_timeout() {
                    return Err(err);
                }
                warn!(url, error = %err, "page never became ready");
                self.on_fetch_failure(ExtractError::timeout(url, "WaitForSelector", err.source))?;
            }
        }

        if self.opts.lazy_load_passes > 0 {
            session.lazy_load(self.opts.lazy_load_passes).await?;
        }

        session.content().await
    }

    fn on_fetch_failure(&self, err: ExtractError) -> Result<(), ExtractError> {
        match self.opts.fetch_failure {
            FetchFailurePolicy::Continue => Ok(()),
            FetchFailurePolicy::Abort => Err(err),
        }
    }

    fn assemble(
        &self,
        url: &str,
        html: &str,
        strategy: &Strategy,
    ) -> Result<ArticleRecord, ExtractError> {
        let page = LoadedPage::parse(url, html);

        let title = strategy.extract_title(&page);
        let content_html = strategy.extract_content_html(&page);
        let content_text = strategy.extract_content_text(&page);
        let published_raw = strategy.extract_published_raw(&page);

        let Some(content_html) = content_html else {
            return Err(ExtractError::content_missing(url, "Extract"));
        };

        let reference = self.opts.clock.now();
        let published_at = self
            .normalizer
            .normalize(published_raw.as_deref(), &reference);
        if let (Some(raw), None) = (&published_raw, &published_at) {
            debug!(url, raw = %raw, "publish date not recognized");
        }

        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.opts.title_placeholder.clone());

        let record = ArticleRecord::new(url, title)
            .map_err(|e| ExtractError::invalid_url(url, "Extract", Some(anyhow::anyhow!("{}", e))))?
            .with_content(Some(content_html), content_text)
            .with_published_at(published_at);

        info!(url, strategy = strategy.name(), "article extracted");
        Ok(record)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use crate::options::Clock;
    use chrono::{TimeZone, Utc};

    fn pipeline(html: &str) -> ExtractionPipeline {
        ExtractionPipeline::builder()
            .fetcher(StaticFetcher::new(html))
            .clock(Clock::Fixed(
                Utc.with_ymd_and_hms(2024, 11, 5, 14, 45, 10).unwrap(),
            ))
            .build()
    }

    #[tokio::test]
    async fn blank_title_gets_placeholder() {
        let p = pipeline("<html><body><article><h1>  </h1><p>tekst</p></article></body></html>");
        let record = p.try_extract("https://example.com/a").await.unwrap();
        assert_eq!(record.title(), "(brak tytułu)");
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_fetching() {
        let p = pipeline("<article>x</article>");
        let err = p.try_extract("nie-url").await.unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn panic_message_reads_str_and_string() {
        let a: Box<dyn Any + Send> = Box::new("boom");
        let b: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let c: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*a), "boom");
        assert_eq!(panic_message(&*b), "bang");
        assert_eq!(panic_message(&*c), "unknown panic");
    }
}
