//! Catalog link extractor
//!
//! Parses one catalog listing page and returns the canonical URLs of the book
//! pages it links to.

use crate::url::{canonicalize_url, BookLinkFilter};
use indexmap::IndexSet;
use scraper::{Html, Selector};
use url::Url;

/// Extracts canonical book links from a catalog page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` targets that resolve to a book page on the target site
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything the [`BookLinkFilter`] rejects
///
/// Query strings and fragments are stripped, so anchors that differ only in
/// tracking parameters collapse into one entry. Links are returned in the order
/// they first appear in the document.
///
/// # Example
///
/// ```
/// use litres_harvest::crawler::extract_links;
/// use litres_harvest::url::BookLinkFilter;
/// use url::Url;
///
/// let html = r#"<a href="/book/ivan/dragons-1/?lfrom=5">Dragons</a>
///               <a href="/book/ivan/dragons-1/">Dragons again</a>"#;
/// let base = Url::parse("https://www.litres.ru/popular/?page=1").unwrap();
/// let filter = BookLinkFilter::new("litres.ru", "/book(?:/|$)").unwrap();
///
/// let links = extract_links(html, &base, &filter);
/// assert_eq!(links.len(), 1);
/// assert!(links.contains("https://www.litres.ru/book/ivan/dragons-1/"));
/// ```
pub fn extract_links(html: &str, base_url: &Url, filter: &BookLinkFilter) -> IndexSet<String> {
    let document = Html::parse_document(html);
    let mut links = IndexSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = resolve_link(href, base_url) {
            if filter.accepts(&url) {
                links.insert(canonicalize_url(&url));
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only and empty hrefs
/// - Invalid URLs
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    base_url.join(href).ok()
}
