// ABOUTME: Fallback extraction strategy for pages without a dedicated selector table.
// ABOUTME: Uses metadata, semantic containers, class-name keywords and date metadata heuristics.

//! Generic extraction heuristics.
//!
//! Lookup orders:
//! - title: `og:title` → `<title>` → first `<h1>`.
//! - body: `<article>` → `<main>` → first `<div>` whose class contains one of
//!   [`CONTENT_CLASS_KEYWORDS`] (keyword order wins over document order) →
//!   `<body>`. The `<body>` fallback drags in navigation and footers; it is
//!   lossy but still counts as found.
//! - date: one candidate per entry of [`DATE_LOCATIONS`], then JSON-LD
//!   `datePublished`, then `time[datetime]`; when none of these match, the
//!   visible text of every `<time>` element in document order.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::extractors::fields::{all_texts, element_text, first_attr, first_text, select_first};
use crate::extractors::{ContentExtraction, DateCandidates, LoadedPage};

/// Class name fragments that suggest an article container, in priority order.
pub const CONTENT_CLASS_KEYWORDS: &[&str] = &[
    "content",
    "post",
    "article",
    "entry",
    "post-content",
    "article-body",
];

/// Publish date metadata locations in priority order.
const DATE_LOCATIONS: &[&str] = &[
    "meta[property='article:published_time']",
    "meta[name='pubdate']",
    "meta[name='publish-date']",
    "meta[name='publication_date']",
    "meta[name='date']",
    "[itemprop='datePublished']",
];

const JSON_LD_SELECTOR: &str = "script[type='application/ld+json']";

/// Heuristic strategy for unknown markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericStrategy;

impl GenericStrategy {
    /// Locates the main content element. Body HTML and body text both come from it.
    pub fn locate_content<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        for tag in ["article", "main"] {
            if let Some(el) = select_first(doc, tag).filter(has_markup) {
                return Some(el);
            }
        }

        let divs = Selector::parse("div").ok()?;
        for keyword in CONTENT_CLASS_KEYWORDS {
            let found = doc.select(&divs).find(|el| {
                el.value().classes().any(|class| class.contains(keyword)) && has_markup(el)
            });
            if found.is_some() {
                return found;
            }
        }

        select_first(doc, "body").filter(has_markup)
    }
}

impl ContentExtraction for GenericStrategy {
    fn extract_title(&self, page: &LoadedPage) -> Option<String> {
        let doc = page.document();
        first_attr(doc, "meta[property='og:title']", &["content"])
            .or_else(|| first_text(doc, "title"))
            .or_else(|| first_text(doc, "h1"))
    }

    fn extract_content_html(&self, page: &LoadedPage) -> Option<String> {
        self.locate_content(page.document()).map(|el| el.html())
    }

    fn extract_content_text(&self, page: &LoadedPage) -> Option<String> {
        self.locate_content(page.document())
            .and_then(|el| element_text(&el))
    }

    fn published_candidates(&self, page: &LoadedPage) -> DateCandidates {
        let doc = page.document();
        let mut candidates: Vec<String> = DATE_LOCATIONS
            .iter()
            .filter_map(|sel| first_attr(doc, sel, &["content", "datetime"]))
            .collect();
        candidates.extend(json_ld_date_published(doc));
        candidates.extend(first_attr(doc, "time[datetime]", &["datetime"]));

        if candidates.is_empty() {
            candidates = all_texts(doc, "time");
        }
        DateCandidates::new(candidates)
    }
}

fn has_markup(el: &ElementRef<'_>) -> bool {
    !el.inner_html().trim().is_empty()
}

/// First `datePublished` found in any JSON-LD block, including `@graph` arrays.
fn json_ld_date_published(doc: &Html) -> Option<String> {
    let sel = Selector::parse(JSON_LD_SELECTOR).ok()?;
    doc.select(&sel).find_map(|script| {
        let raw: String = script.text().collect();
        let value: Value = serde_json::from_str(raw.trim()).ok()?;
        find_date_published(&value)
    })
}

fn find_date_published(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(date)) = map.get("datePublished") {
                let date = date.trim();
                if !date.is_empty() {
                    return Some(date.to_string());
                }
            }
            map.values().find_map(find_date_published)
        }
        Value::Array(items) => items.iter().find_map(find_date_published),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(html: &str) -> LoadedPage {
        LoadedPage::parse("https://unknown.example.org/a", html)
    }

    #[test]
    fn title_prefers_og_then_title_then_h1() {
        let full = page(
            r#"<html><head><meta property="og:title" content="OG"><title>Doc</title></head>
               <body><h1>Heading</h1></body></html>"#,
        );
        assert_eq!(GenericStrategy.extract_title(&full).as_deref(), Some("OG"));

        let no_og = page("<html><head><title> Doc </title></head><body><h1>H</h1></body></html>");
        assert_eq!(GenericStrategy.extract_title(&no_og).as_deref(), Some("Doc"));

        let only_h1 = page("<html><body><h1>Heading</h1></body></html>");
        assert_eq!(
            GenericStrategy.extract_title(&only_h1).as_deref(),
            Some("Heading")
        );

        let none = page("<html><body><p>x</p></body></html>");
        assert_eq!(GenericStrategy.extract_title(&none), None);
    }

    #[test]
    fn content_prefers_article_over_main() {
        let p = page(
            "<html><body><main><p>main</p></main><article><p>art</p></article></body></html>",
        );
        assert_eq!(
            GenericStrategy.extract_content_html(&p).as_deref(),
            Some("<article><p>art</p></article>")
        );
        assert_eq!(GenericStrategy.extract_content_text(&p).as_deref(), Some("art"));
    }

    #[test]
    fn content_uses_keyword_order_before_document_order() {
        let p = page(
            r#"<html><body>
                 <div class="entry-wrap"><p>entry</p></div>
                 <div class="site-content"><p>content</p></div>
               </body></html>"#,
        );
        assert_eq!(
            GenericStrategy.extract_content_text(&p).as_deref(),
            Some("content")
        );
    }

    #[test]
    fn content_falls_back_to_body() {
        let p = page("<html><body><p>loose text</p></body></html>");
        let html = GenericStrategy.extract_content_html(&p).unwrap();
        assert!(html.starts_with("<body>"));
        assert_eq!(
            GenericStrategy.extract_content_text(&p).as_deref(),
            Some("loose text")
        );
    }

    #[test]
    fn content_skips_empty_containers() {
        let p = page("<html><body><article> </article><main><p>m</p></main></body></html>");
        assert_eq!(GenericStrategy.extract_content_text(&p).as_deref(), Some("m"));
    }

    #[test]
    fn date_candidates_follow_priority() {
        let p = page(
            r#"<html><head>
                 <meta name="date" content="2024-01-02">
                 <meta property="article:published_time" content="2024-10-14T10:11:00+02:00">
                 <script type="application/ld+json">
                   {"@graph": [{"@type": "NewsArticle", "datePublished": "2024-10-13"}]}
                 </script>
               </head>
               <body><time datetime="2024-10-12">12 października</time></body></html>"#,
        );
        let candidates = GenericStrategy.published_candidates(&p);
        assert_eq!(
            candidates.as_slice(),
            &[
                "2024-10-14T10:11:00+02:00".to_string(),
                "2024-01-02".to_string(),
                "2024-10-13".to_string(),
                "2024-10-12".to_string(),
            ]
        );
        assert_eq!(
            GenericStrategy.extract_published_raw(&p).as_deref(),
            Some("2024-10-14T10:11:00+02:00")
        );
    }

    #[test]
    fn itemprop_reads_content_or_datetime() {
        let p = page(r#"<html><body><span itemprop="datePublished" datetime="2024-05-01"></span></body></html>"#);
        assert_eq!(
            GenericStrategy.published_candidates(&p).first(),
            Some("2024-05-01")
        );
    }

    #[test]
    fn date_falls_back_to_visible_time_text() {
        let p = page("<html><body><time>wczoraj</time><time>2 dni temu</time></body></html>");
        let candidates = GenericStrategy.published_candidates(&p);
        assert_eq!(candidates.as_slice(), &["wczoraj".to_string(), "2 dni temu".to_string()]);
    }

    #[test]
    fn broken_json_ld_is_ignored() {
        let p = page(r#"<html><head><script type="application/ld+json">{not json</script></head></html>"#);
        assert!(GenericStrategy.published_candidates(&p).is_empty());
    }
}
