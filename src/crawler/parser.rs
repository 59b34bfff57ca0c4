//! HTML parser for extracting anchors and navigation links
//!
//! `scraper::Html` is not `Send`, so everything here is synchronous and
//! returns owned data; callers parse between awaits and never hold a
//! document across one.

use crate::url::{is_same_site, resolve_href};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Selectors for "next page" style links on directory listings
const PAGINATION_SELECTORS: &[&str] = &[
    ".pagination a",
    ".pager a",
    "a[rel=\"next\"]",
    "a.next",
    ".page-numbers a",
    "[class*=\"pagination\"] a",
];

/// Navigation phrases that lead to a location directory
const DIRECTORY_PHRASES: &[&str] = &[
    "our locations",
    "our dealerships",
    "our stores",
    "locations",
    "find a dealer",
    "dealer locator",
    "dealership locations",
    "find us",
    "our showrooms",
    "all locations",
    "choose location",
    "select dealership",
    "browse locations",
    "dealership directory",
    "where to buy",
];

/// Directory paths recognised in homepage navigation in addition to the
/// configured ones
const DIRECTORY_PATH_HINTS: &[&str] = &[
    "/locations",
    "/dealerships",
    "/our-stores",
    "/dealers",
    "/find-a-dealer",
    "/where-to-buy",
    "/our-locations",
    "/stores",
    "/showrooms",
    "/find-us",
    "/dealership-locations",
    "/group-locations",
];

/// One `<a href>` with its resolved target and visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub url: Url,
    pub text: String,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Every followable anchor, in document order
    pub anchors: Vec<Anchor>,

    /// Pagination targets, deduplicated, in document order
    pub pagination: Vec<Url>,
}

/// Parses HTML content and extracts anchors and pagination links
///
/// # Anchor Extraction Rules
///
/// **Include:** every `<a href="...">` that resolves to an HTTP(S) URL
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - fragment-only links
///
/// Anchor text is the element's text with whitespace collapsed. Image-only
/// links fall back to `aria-label`, `title`, then the first `img[alt]`.
///
/// # Example
///
/// ```
/// use dealer_locator::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/dealers/kendall-ford">Kendall Ford</a></body></html>"#;
/// let base_url = Url::parse("https://kendallautogroup.com/locations").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.anchors[0].text, "Kendall Ford");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        anchors: extract_anchors(&document, base_url),
        pagination: extract_pagination(&document, base_url),
    }
}

/// Returns the pagination links of a directory page
pub fn find_pagination_links(html: &str, base_url: &Url) -> Vec<Url> {
    parse_html(html, base_url).pagination
}

/// Picks anchors on a page that lead to a location directory
///
/// An anchor qualifies when it stays on the same site and either its text
/// is a directory phrase ("Our Locations", "Find a Dealer") or its path
/// ends with a known directory path.
pub fn find_directory_links(
    page: &ParsedPage,
    base_url: &Url,
    directory_paths: &[String],
) -> Vec<Url> {
    let mut found: Vec<Url> = Vec::new();

    for anchor in &page.anchors {
        if !is_same_site(&anchor.url, base_url) {
            continue;
        }

        let text = anchor.text.to_lowercase();
        let by_text = DIRECTORY_PHRASES
            .iter()
            .any(|phrase| text == *phrase || (phrase.contains(' ') && text.contains(phrase)));

        let path = anchor.url.path().trim_end_matches('/').to_lowercase();
        let by_path = !path.is_empty()
            && (directory_paths.iter().any(|p| path.ends_with(p.trim_end_matches('/')))
                || DIRECTORY_PATH_HINTS.iter().any(|p| path.ends_with(p)));

        if by_text || by_path {
            let mut url = anchor.url.clone();
            url.set_fragment(None);
            if !found.contains(&url) {
                found.push(url);
            }
        }
    }

    found
}

fn extract_anchors(document: &Html, base_url: &Url) -> Vec<Anchor> {
    let mut anchors = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return anchors;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = resolve_href(href, base_url) {
            anchors.push(Anchor {
                url,
                text: anchor_text(&element),
            });
        }
    }

    anchors
}

fn anchor_text(element: &ElementRef<'_>) -> String {
    let text = collapse_whitespace(&element.text().collect::<String>());
    if !text.is_empty() {
        return text;
    }

    for attr in ["aria-label", "title"] {
        if let Some(value) = element.value().attr(attr) {
            let value = collapse_whitespace(value);
            if !value.is_empty() {
                return value;
            }
        }
    }

    Selector::parse("img[alt]")
        .ok()
        .and_then(|img_selector| {
            element
                .select(&img_selector)
                .filter_map(|img| img.value().attr("alt"))
                .map(collapse_whitespace)
                .find(|alt| !alt.is_empty())
        })
        .unwrap_or_default()
}

fn extract_pagination(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links: Vec<Url> = Vec::new();

    for selector in PAGINATION_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if href.contains('#') {
                continue;
            }
            if let Some(url) = resolve_href(href, base_url) {
                if !links.contains(&url) {
                    links.push(url);
                }
            }
        }
    }

    links
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
