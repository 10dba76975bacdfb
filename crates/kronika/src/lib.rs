// ABOUTME: Main library entry point for the kronika publisher article extractor.
// ABOUTME: Re-exports the public API: ExtractionPipeline, PipelineBuilder, ArticleRecord, ExtractError, strategies and fetchers.

//! Kronika - extracts normalized articles from publisher pages.
//!
//! A page is fetched through a [`PageFetcher`], matched to a per-domain
//! [`Strategy`] (or the generic fallback), and its title, body and publish date
//! are assembled into an [`ArticleRecord`] with the date normalized to
//! Europe/Warsaw.
//!
//! # Example
//!
//! ```no_run
//! use kronika::ExtractionPipeline;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = ExtractionPipeline::builder().build();
//!     if let Some(record) = pipeline.extract("https://galicjaexpress.pl/wiadomosci/1").await {
//!         println!("{} ({:?})", record.title(), record.published_at());
//!     }
//! }
//! ```

pub mod error;
pub mod extractors;
pub mod fetch;
pub mod options;
pub mod pipeline;
pub mod record;
pub mod registry;

pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractors::{
    ContentExtraction, DateCandidates, GenericStrategy, LoadedPage, SiteSelectors, Strategy,
};
pub use crate::fetch::{HttpFetcher, HttpFetcherBuilder, Navigation, PageFetcher, PageSession, StaticFetcher};
#[cfg(feature = "webdriver")]
pub use crate::fetch::WebDriverFetcher;
pub use crate::options::{
    Clock, FetchFailurePolicy, Options, PipelineBuilder, UnknownDomainPolicy, TITLE_PLACEHOLDER,
};
pub use crate::pipeline::ExtractionPipeline;
pub use crate::record::ArticleRecord;
pub use crate::registry::StrategyRegistry;
