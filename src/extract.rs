//! Visible-text extraction from HTML.
//!
//! Parsing sits behind [`VisibleTextParser`] so the HTML library can be swapped
//! without changing what [`extract_visible_text`] returns.

use scraper::{ElementRef, Html, Node};

/// Maximum characters of content forwarded to the model.
pub const MAX_TEXT_CHARS: usize = 4000;

/// Elements removed together with their whole subtree.
pub const SKIPPED_TAGS: [&str; 5] = ["script", "style", "head", "nav", "footer"];

pub trait VisibleTextParser {
    /// Returns the text nodes of `html` in document order, skipping every
    /// element named in `skipped_tags` and everything beneath it.
    fn text_fragments(&self, html: &str, skipped_tags: &[&str]) -> Vec<String>;
}

/// Default parser backed by `scraper` (html5ever), best-effort on malformed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperParser;

impl VisibleTextParser for ScraperParser {
    fn text_fragments(&self, html: &str, skipped_tags: &[&str]) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut fragments = Vec::new();
        let root = document.root_element();
        if !skipped_tags.contains(&root.value().name()) {
            collect_text(root, skipped_tags, &mut fragments);
        }
        fragments
    }
}

fn collect_text(element: ElementRef<'_>, skipped_tags: &[&str], out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(text.to_string()),
            Node::Element(el) if !skipped_tags.contains(&el.name()) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, skipped_tags, out);
                }
            }
            _ => {}
        }
    }
}

/// Extract the visible text of an HTML document, capped at `max_chars`.
pub fn extract_visible_text(html: &str, max_chars: usize) -> String {
    extract_visible_text_with(&ScraperParser, html, max_chars)
}

pub fn extract_visible_text_with<P: VisibleTextParser + ?Sized>(
    parser: &P,
    html: &str,
    max_chars: usize,
) -> String {
    let joined = parser
        .text_fragments(html, &SKIPPED_TAGS)
        .iter()
        .map(|fragment| fragment.trim())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(&collapse_whitespace(&joined), max_chars).to_string()
}

/// Collapse every whitespace run into a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Hard cut at `max_chars` characters; never splits a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
