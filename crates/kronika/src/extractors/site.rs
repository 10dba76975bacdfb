// ABOUTME: Selector tables for the publisher domains with dedicated extraction rules.
// ABOUTME: Title, body and date each come from one fixed CSS location per site.

use crate::extractors::fields::{element_inner_html, element_text, first_text, select_first};
use crate::extractors::{ContentExtraction, DateCandidates, LoadedPage};

/// Fixed CSS locations for one publisher's article template.
///
/// The body HTML and body text are both read from the first element matching
/// `content`, so they always describe the same subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteSelectors {
    pub title: &'static str,
    pub content: &'static str,
    pub published: &'static str,
}

pub const TAKE_GROUP: SiteSelectors = SiteSelectors {
    title: "article h1",
    content: "div[class*='article-content']",
    published: "time",
};

/// The date sits in the first paragraph of the article.
pub const GALICJA_EXPRESS: SiteSelectors = SiteSelectors {
    title: "article h1",
    content: "div.post-text-two-red",
    published: "article p",
};

impl ContentExtraction for SiteSelectors {
    fn extract_title(&self, page: &LoadedPage) -> Option<String> {
        first_text(page.document(), self.title)
    }

    fn extract_content_html(&self, page: &LoadedPage) -> Option<String> {
        select_first(page.document(), self.content).and_then(|el| element_inner_html(&el))
    }

    fn extract_content_text(&self, page: &LoadedPage) -> Option<String> {
        select_first(page.document(), self.content).and_then(|el| element_text(&el))
    }

    fn published_candidates(&self, page: &LoadedPage) -> DateCandidates {
        first_text(page.document(), self.published).into()
    }
}
