// ABOUTME: Selector helpers shared by the extraction strategies.
// ABOUTME: Provides first-match lookups for elements, text and attributes plus whitespace collapsing.

//! Selector helpers.
//!
//! Key behaviors:
//! - Invalid selectors are treated as no match.
//! - Text is joined with spaces and whitespace is collapsed.
//! - Empty strings are treated as no match.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose boundaries separate words in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

fn is_block(node: &Node) -> bool {
    matches!(node, Node::Element(el) if BLOCK_TAGS.contains(&el.name()))
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed text of an element, or `None` if it has no visible text.
///
/// Text nodes are joined as written; only block boundaries add a space.
pub fn element_text(el: &ElementRef<'_>) -> Option<String> {
    let mut text = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => {
                if node.prev_sibling().is_some_and(|prev| is_block(prev.value())) {
                    text.push(' ');
                }
                text.push_str(t);
            }
            other if is_block(other) => text.push(' '),
            _ => {}
        }
    }
    let normalized = normalize_whitespace(&text);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Inner HTML of an element, or `None` if it holds only whitespace.
pub fn element_inner_html(el: &ElementRef<'_>) -> Option<String> {
    let html = el.inner_html();
    if html.trim().is_empty() {
        None
    } else {
        Some(html)
    }
}

/// Returns the first element matching `selector`.
pub fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).next()
}

/// Text of the first element matching `selector`, if that element has any text.
pub fn first_text(doc: &Html, selector: &str) -> Option<String> {
    select_first(doc, selector).and_then(|el| element_text(&el))
}

/// First non-empty value among `attrs` on the first element matching `selector`.
pub fn first_attr(doc: &Html, selector: &str, attrs: &[&str]) -> Option<String> {
    let el = select_first(doc, selector)?;
    attrs.iter().find_map(|attr| {
        el.value()
            .attr(attr)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// Text of every element matching `selector`, in document order, skipping empty ones.
pub fn all_texts(doc: &Html, selector: &str) -> Vec<String> {
    let sel = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return vec![],
    };
    doc.select(&sel).filter_map(|el| element_text(&el)).collect()
}
