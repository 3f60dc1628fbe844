//! HTML helpers shared by the discoverer and the extractor
//!
//! Thin wrappers over `scraper` for the handful of queries the pipeline
//! needs: trimmed element text, attribute lookup, and link resolution.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parses a CSS selector; `None` for a selector `scraper` rejects
pub fn parse_selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Text content of an element with surrounding whitespace removed
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Replaces every whitespace run with a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text of every match, trimmed; `None` when empty
pub fn select_text(document: &Html, css: &str) -> Option<String> {
    let selector = parse_selector(css)?;
    let text: String = document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Trimmed, non-empty text of every match, in document order
pub fn select_texts(document: &Html, css: &str) -> Vec<String> {
    let Some(selector) = parse_selector(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Non-empty attribute value of the first match
pub fn select_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = parse_selector(css)?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment is dropped so the same page reached through different
/// anchors is only collected once.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
