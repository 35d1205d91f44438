//! HTML helpers shared by the site extractors.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};
use url::Url;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Elements whose text never belongs to a description.
pub const NON_DESCRIPTION_TAGS: &[&str] = &["button", "a", "iframe", "script", "style"];

/// Parses a CSS selector, logging invalid ones.
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(selector = css, error = %e, "Invalid CSS selector");
            None
        }
    }
}

/// Collapses runs of whitespace into single spaces and trims.
pub fn squash(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Text content of an element, whitespace-collapsed. `None` when empty.
pub fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = squash(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// First element matching `css`.
pub fn first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    doc.select(&sel).next()
}

/// Text of the first element matching `css`.
pub fn first_text(doc: &Html, css: &str) -> Option<String> {
    first(doc, css).and_then(element_text)
}

/// Text of the first element matching `css` whose text contains `needle`.
pub fn find_text_containing(doc: &Html, css: &str, needle: &str) -> Option<String> {
    let sel = selector(css)?;
    doc.select(&sel)
        .filter_map(element_text)
        .find(|text| text.contains(needle))
}

/// Text after the first `:`, trimmed. `None` if there is no colon.
pub fn after_colon(text: &str) -> Option<String> {
    let (_, value) = text.split_once(':')?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Block text of an element: one trimmed line per text node, skipping
/// anything inside `excluded` tags.
pub fn block_text(element: ElementRef<'_>, excluded: &[&str]) -> Option<String> {
    let root = element.id();
    let mut lines = Vec::new();

    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let inside_excluded = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root)
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|el| excluded.contains(&el.name()));
        if inside_excluded {
            continue;
        }

        let line = squash(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Absolute, deduplicated `href`s of elements matching `css`, in document
/// order. Relative links are resolved against `base`; non-HTTP links are
/// dropped.
pub fn collect_links(html: &str, css: &str, base: &str) -> Vec<String> {
    let Some(sel) = selector(css) else {
        return Vec::new();
    };
    let base = Url::parse(base).ok();
    let doc = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in doc.select(&sel) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let resolved = match &base {
            Some(base) => base.join(href.trim()),
            None => Url::parse(href.trim()),
        };
        match resolved {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            Ok(url) => debug!(href, scheme = url.scheme(), "Skipping non-HTTP link"),
            Err(e) => debug!(href, error = %e, "Skipping unparseable link"),
        }
    }

    links
}

/// Logs a missing field and passes the value through.
pub fn require(field: &'static str, url: &str, value: Option<String>) -> Option<String> {
    if value.is_none() {
        warn!(field, url, "Field not found");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_links_resolves_and_dedupes() {
        let html = r#"
            <a class="name" href="/job/1">One</a>
            <a class="name" href="https://example.com/job/2">Two</a>
            <a class="name" href="/job/1">One again</a>
            <a class="name" href="mailto:jobs@example.com">Mail</a>
            <a class="other" href="/job/3">Other</a>
        "#;

        let links = collect_links(html, "a.name", "https://example.com/list/?page=2");
        assert_eq!(
            links,
            vec!["https://example.com/job/1", "https://example.com/job/2"]
        );
    }

    #[test]
    fn test_block_text_skips_excluded_tags() {
        let doc = Html::parse_document(
            r#"<div class="description">
                <p>Pick   apples</p>
                <button>Apply now</button>
                <p>Start <a href="/x">here</a> Monday</p>
            </div>"#,
        );
        let div = first(&doc, "div.description").unwrap();

        let text = block_text(div, NON_DESCRIPTION_TAGS).unwrap();
        assert_eq!(text, "Pick apples\nStart\nMonday");
    }

    #[test]
    fn test_after_colon() {
        assert_eq!(after_colon("Location: Mildura").as_deref(), Some("Mildura"));
        assert_eq!(after_colon("Location:   "), None);
        assert_eq!(after_colon("Mildura"), None);
    }

    #[test]
    fn test_find_text_containing() {
        let doc = Html::parse_document(
            "<ul><li>Duration: 3 months</li><li>$28.50 per hour</li></ul>",
        );
        assert_eq!(
            find_text_containing(&doc, "li", "per hour").as_deref(),
            Some("$28.50 per hour")
        );
        assert!(find_text_containing(&doc, "li", "Start:").is_none());
    }

    #[test]
    fn test_invalid_selector_yields_nothing() {
        assert!(selector("div[").is_none());
        assert!(collect_links("<a href='/x'></a>", "a[", "https://example.com").is_empty());
    }
}
