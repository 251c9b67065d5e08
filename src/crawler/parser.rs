//! HTML parser for extracting links
//!
//! This module handles parsing HTML content to extract the links to follow
//! (from `<a>` tags and canonical links), resolved against the document base.

use scraper::{Html, Selector};
use url::Url;

/// Produces the candidate links found in a page
///
/// Implementations never fail: malformed markup yields an empty or partial
/// sequence. The sequence is finite, and calling `extract` again on the same
/// input yields the same sequence.
pub trait LinkExtractor: Send + Sync {
    /// Returns the absolute link URLs found in `html`
    ///
    /// # Arguments
    ///
    /// * `html` - The HTML content to parse
    /// * `base` - URL the page was fetched from, used for relative links
    fn extract<'a>(&self, html: &'a str, base: &'a Url) -> Box<dyn Iterator<Item = String> + 'a>;
}

/// scraper-backed link extractor
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - Empty hrefs and same-page `#fragment` links
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Anything that is not HTTP(S) after resolution
///
/// A `<base href>` in the document, when present and valid, replaces the
/// fetch URL as the base for relative links.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract<'a>(&self, html: &'a str, base: &'a Url) -> Box<dyn Iterator<Item = String> + 'a> {
        // scraper's Html is not Send, so the document is dropped before returning
        Box::new(extract_links(html, base).into_iter())
    }
}

/// Parses HTML content and collects every followable link
///
/// # Example
///
/// ```
/// use site_harvest::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base_url), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, base_url);

    let mut links = Vec::new();

    // Extract links from <a> tags
    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, &base) {
                    links.push(absolute_url);
                }
            }
        }
    }

    // Extract canonical link
    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, &base) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Returns the effective base URL of the document
///
/// The first `<base href>` wins; an unusable one is ignored.
fn document_base(document: &Html, fetched_from: &Url) -> Url {
    let Ok(selector) = Selector::parse("base[href]") else {
        return fetched_from.clone();
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| fetched_from.join(href.trim()).ok())
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .unwrap_or_else(|| fetched_from.clone())
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    // Skip empty hrefs
    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            // Only accept HTTP and HTTPS URLs
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        let base = base_url();
        HtmlLinkExtractor.extract(html, &base).collect()
    }

    #[test]
    fn test_extract_absolute_links() {
        let html = r#"<html><body>
            <a href="https://example.com/page1">Link 1</a>
            <a href="https://other.com/page2">Link 2</a>
        </body></html>"#;
        assert_eq!(
            links(html),
            vec!["https://example.com/page1", "https://other.com/page2"]
        );
    }

    #[test]
    fn test_extract_relative_links() {
        let html = r#"<html><body>
            <a href="/absolute">Absolute path</a>
            <a href="relative">Relative path</a>
            <a href="../up">Parent path</a>
            <a href="//cdn.example.com/x">Protocol relative</a>
        </body></html>"#;
        assert_eq!(
            links(html),
            vec![
                "https://example.com/absolute",
                "https://example.com/relative",
                "https://example.com/up",
                "https://cdn.example.com/x",
            ]
        );
    }

    #[test]
    fn test_skip_special_schemes_and_anchors() {
        let html = r##"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Phone</a>
            <a href="data:text/html,hi">Data</a>
            <a href="ftp://example.com/file">FTP</a>
            <a href="#section">Anchor</a>
            <a href="">Empty</a>
            <a href="   ">Blank</a>
            <a href="/ok">OK</a>
        </body></html>"##;
        assert_eq!(links(html), vec!["https://example.com/ok"]);
    }

    #[test]
    fn test_skip_download_links() {
        let html = r#"<html><body>
            <a href="/file.zip" download>Download</a>
            <a href="/page">Page</a>
        </body></html>"#;
        assert_eq!(links(html), vec!["https://example.com/page"]);
    }

    #[test]
    fn test_canonical_link() {
        let html = r#"<html><head>
            <link rel="canonical" href="https://example.com/canonical">
            <link rel="stylesheet" href="/style.css">
        </head><body></body></html>"#;
        assert_eq!(links(html), vec!["https://example.com/canonical"]);
    }

    #[test]
    fn test_base_href_changes_resolution() {
        let html = r#"<html><head><base href="https://example.com/docs/"></head>
            <body><a href="intro">Intro</a></body></html>"#;
        assert_eq!(links(html), vec!["https://example.com/docs/intro"]);
    }

    #[test]
    fn test_invalid_base_href_ignored() {
        let html = r#"<html><head><base href="mailto:x@example.com"></head>
            <body><a href="a">A</a></body></html>"#;
        assert_eq!(links(html), vec!["https://example.com/a"]);
    }

    #[test]
    fn test_malformed_html_does_not_fail() {
        let html = r#"<html><body><a href="/one">unclosed <div><a href="/two"<p>"#;
        let found = links(html);
        assert!(found.contains(&"https://example.com/one".to_string()));

        assert!(links("").is_empty());
        assert!(links("not html at all <<<>>>").is_empty());
    }

    #[test]
    fn test_extraction_is_restartable() {
        let html = r#"<a href="/a">A</a><a href="/b">B</a><a href="/a">A again</a>"#;
        let base = base_url();
        let extractor = HtmlLinkExtractor::new();

        let first: Vec<_> = extractor.extract(html, &base).collect();
        let second: Vec<_> = extractor.extract(html, &base).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
