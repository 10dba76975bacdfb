// ABOUTME: Registry mapping publisher domains to extraction strategies.
// ABOUTME: Matches hosts exactly or by dot-suffix, in registration order, with a generic fallback.

use tracing::warn;
use url::Url;

use crate::extractors::Strategy;

/// Read-only mapping from domain to [`Strategy`].
///
/// A host matches an entry when it equals the domain or ends with `"." + domain`.
/// Entries are checked in registration order and the first match wins.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    entries: Vec<(String, Strategy)>,
    fallback: Strategy,
}

impl StrategyRegistry {
    /// Creates an empty registry that resolves everything to the generic strategy.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            fallback: Strategy::generic(),
        }
    }

    /// The publisher domains with dedicated strategies.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("take-group.github.io", Strategy::TakeGroup);
        registry.register("galicjaexpress.pl", Strategy::GalicjaExpress);
        registry
    }

    /// Registers `strategy` for `domain` and its subdomains.
    pub fn register(&mut self, domain: impl Into<String>, strategy: Strategy) {
        let domain = domain.into().trim().trim_matches('.').to_lowercase();
        self.entries.push((domain, strategy));
    }

    /// Returns the registered strategy for the host of `url`, if any.
    pub fn find(&self, url: &str) -> Option<&Strategy> {
        let host = host_of(url)?;
        self.entries
            .iter()
            .find(|(domain, _)| matches_domain(&host, domain))
            .map(|(_, strategy)| strategy)
    }

    /// Returns the strategy for `url`, falling back to the generic one.
    pub fn resolve(&self, url: &str) -> &Strategy {
        match self.find(url) {
            Some(strategy) => strategy,
            None => {
                warn!(url, "no scraper for domain, using generic extraction");
                &self.fallback
            }
        }
    }

    pub fn fallback(&self) -> &Strategy {
        &self.fallback
    }

    /// Returns the number of registered domains.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no domains are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lower-cased host of `url`.
fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(str::to_lowercase)
}

fn matches_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
