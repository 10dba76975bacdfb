// ABOUTME: Configuration for the extraction pipeline including failure policies, Options, and PipelineBuilder.
// ABOUTME: PipelineBuilder provides a fluent API for constructing ExtractionPipeline instances.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::fetch::{HttpFetcher, PageFetcher};
use crate::pipeline::ExtractionPipeline;
use crate::registry::StrategyRegistry;

/// Title used when a page has none.
pub const TITLE_PLACEHOLDER: &str = "(brak tytułu)";

/// Selectors that mark a publisher page as rendered.
pub const READY_SELECTORS: &[&str] = &["article", "div.article-content", ".post-text-two-red"];

/// What to do after a failed navigation (no response, status ≥ 400) or readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Log and extract from whatever document the session holds.
    #[default]
    Continue,
    /// Stop and report a Fetch or Timeout error.
    Abort,
}

/// What to do when no dedicated strategy matches the URL's host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownDomainPolicy {
    /// Log "no scraper for domain" and use the generic strategy.
    #[default]
    Fallback,
    /// Report an UnknownDomain error.
    Reject,
}

/// Source of the reference instant for relative dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(instant) => *instant,
        }
    }
}

/// Configuration options for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct Options {
    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,
    pub ready_selectors: Vec<String>,
    pub lazy_load_passes: u32,
    pub fetch_failure: FetchFailurePolicy,
    pub unknown_domain: UnknownDomainPolicy,
    pub title_placeholder: String,
    pub zone: Tz,
    pub clock: Clock,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(40),
            selector_timeout: Duration::from_secs(30),
            ready_selectors: READY_SELECTORS.iter().map(|s| s.to_string()).collect(),
            lazy_load_passes: 0,
            fetch_failure: FetchFailurePolicy::Continue,
            unknown_domain: UnknownDomainPolicy::Fallback,
            title_placeholder: TITLE_PLACEHOLDER.to_string(),
            zone: kronika_dates::DEFAULT_ZONE,
            clock: Clock::System,
        }
    }
}

/// Builder for constructing ExtractionPipeline instances with custom configuration.
#[derive(Clone, Default)]
pub struct PipelineBuilder {
    opts: Options,
    registry: Option<Arc<StrategyRegistry>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("opts", &self.opts)
            .field("registry", &self.registry)
            .field("fetcher", &self.fetcher.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl PipelineBuilder {
    /// Create a new PipelineBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound on navigation.
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.opts.navigation_timeout = timeout;
        self
    }

    /// Bound on waiting for the ready selectors.
    pub fn selector_timeout(mut self, timeout: Duration) -> Self {
        self.opts.selector_timeout = timeout;
        self
    }

    /// Replace the readiness selectors. An empty list skips the wait.
    pub fn ready_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.ready_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Number of scroll passes before reading the document.
    pub fn lazy_load_passes(mut self, passes: u32) -> Self {
        self.opts.lazy_load_passes = passes;
        self
    }

    pub fn fetch_failure(mut self, policy: FetchFailurePolicy) -> Self {
        self.opts.fetch_failure = policy;
        self
    }

    pub fn unknown_domain(mut self, policy: UnknownDomainPolicy) -> Self {
        self.opts.unknown_domain = policy;
        self
    }

    pub fn title_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.opts.title_placeholder = placeholder.into();
        self
    }

    /// Zone every published date is converted to.
    pub fn zone(mut self, zone: Tz) -> Self {
        self.opts.zone = zone;
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.opts.clock = clock;
        self
    }

    /// Set a custom strategy registry.
    pub fn registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Set the page-fetching collaborator.
    pub fn fetcher(mut self, fetcher: impl PageFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Build the pipeline. Defaults to the builtin registry and a plain HTTP fetcher.
    pub fn build(self) -> ExtractionPipeline {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(StrategyRegistry::builtin()));
        let fetcher = self
            .fetcher
            .unwrap_or_else(|| Arc::new(HttpFetcher::default()));
        ExtractionPipeline::new(self.opts, registry, fetcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_match_publisher_setup() {
        let opts = Options::default();
        assert_eq!(opts.navigation_timeout, Duration::from_secs(40));
        assert_eq!(opts.selector_timeout, Duration::from_secs(30));
        assert_eq!(opts.ready_selectors.len(), 3);
        assert_eq!(opts.fetch_failure, FetchFailurePolicy::Continue);
        assert_eq!(opts.unknown_domain, UnknownDomainPolicy::Fallback);
        assert_eq!(opts.title_placeholder, "(brak tytułu)");
        assert_eq!(opts.zone, chrono_tz::Europe::Warsaw);
    }

    #[test]
    fn fixed_clock_returns_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 11, 5, 14, 45, 10).unwrap();
        assert_eq!(Clock::Fixed(instant).now(), instant);
    }

    #[test]
    fn builder_sets_options() {
        let builder = PipelineBuilder::new()
            .ready_selectors(Vec::<String>::new())
            .lazy_load_passes(5)
            .fetch_failure(FetchFailurePolicy::Abort)
            .unknown_domain(UnknownDomainPolicy::Reject);
        assert!(builder.opts.ready_selectors.is_empty());
        assert_eq!(builder.opts.lazy_load_passes, 5);
        assert_eq!(builder.opts.fetch_failure, FetchFailurePolicy::Abort);
        assert_eq!(builder.opts.unknown_domain, UnknownDomainPolicy::Reject);
    }
}
