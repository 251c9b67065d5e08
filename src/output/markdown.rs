//! HTML to Markdown-like text conversion
//!
//! This module turns a fetched page into the text that gets saved: headings,
//! paragraphs, emphasis, lists, quotes and code are rendered with Markdown
//! markers, and page chrome (scripts, styles, navigation, header, footer) is
//! dropped.

use scraper::{ElementRef, Html, Selector};

/// Default minimum number of characters a page must exceed to be saved
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 100;

/// Elements rendered into the output, in document order
const CONTENT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "strong", "b", "em", "i", "ul", "ol", "blockquote",
    "code", "pre",
];

/// Elements whose whole subtree is ignored
const IGNORED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Converts HTML into the text that is persisted for a page
pub trait TextExtractor: Send + Sync {
    /// Returns the page text, or an empty string when the page has too little
    /// content to be worth saving
    fn extract_text(&self, html: &str) -> String;
}

/// scraper-backed Markdown-like extractor
#[derive(Debug, Clone, Copy)]
pub struct MarkdownExtractor {
    min_length: usize,
}

impl MarkdownExtractor {
    /// Creates an extractor that drops pages whose text is not longer than
    /// `min_length` characters
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl Default for MarkdownExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TEXT_LENGTH)
    }
}

impl TextExtractor for MarkdownExtractor {
    fn extract_text(&self, html: &str) -> String {
        let text = html_to_markdown(html);
        if text.chars().count() > self.min_length {
            text
        } else {
            String::new()
        }
    }
}

/// Converts an HTML document to Markdown-like text without any length filter
///
/// An element nested inside another rendered element (a `<strong>` inside a
/// `<p>`, say) is covered by its ancestor's text and is not rendered again.
///
/// # Example
///
/// ```
/// use site_harvest::output::html_to_markdown;
///
/// let html = "<h1>Title</h1><p>Body <em>text</em></p><ul><li>a</li><li>b</li></ul>";
/// assert_eq!(html_to_markdown(html), "# Title\n\nBody text\n\n- a\n- b");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(&CONTENT_TAGS.join(", ")) else {
        return String::new();
    };

    let blocks: Vec<String> = document
        .select(&selector)
        .filter(|element| !has_ancestor_in(element, IGNORED_TAGS))
        .filter(|element| !has_ancestor_in(element, CONTENT_TAGS))
        .map(convert_element)
        .collect();

    collapse_blank_lines(&blocks.join("\n")).trim().to_string()
}

fn convert_element(element: ElementRef<'_>) -> String {
    let tag = element.value().name();
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            format!("\n{} {}\n", "#".repeat(level), element_text(element))
        }
        "strong" | "b" => format!("**{}**", element_text(element)),
        "em" | "i" => format!("*{}*", element_text(element)),
        "ul" => format!(
            "\n{}\n",
            list_items(element)
                .iter()
                .map(|item| format!("- {}", item))
                .collect::<Vec<_>>()
                .join("\n")
        ),
        "ol" => format!(
            "\n{}\n",
            list_items(element)
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, item))
                .collect::<Vec<_>>()
                .join("\n")
        ),
        "blockquote" => format!("\n> {}\n", element_text(element)),
        "code" => format!("`{}`", element_text(element)),
        "pre" => format!("\n```\n{}\n```\n", element_text(element)),
        "p" => format!("\n{}\n", element_text(element)),
        _ => element_text(element),
    }
}

/// Text content with whitespace runs collapsed to single spaces
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn list_items(element: ElementRef<'_>) -> Vec<String> {
    let Ok(li) = Selector::parse("li") else {
        return Vec::new();
    };
    element.select(&li).map(element_text).collect()
}

fn has_ancestor_in(element: &ElementRef<'_>, tags: &[&str]) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map(|e| tags.contains(&e.name()))
            .unwrap_or(false)
    })
}

/// Replaces every run of three or more newlines with exactly two
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;

    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            continue;
        }
        if newlines > 0 {
            out.push_str(if newlines >= 3 { "\n\n" } else { &"\n\n"[..newlines] });
            newlines = 0;
        }
        out.push(c);
    }
    if newlines > 0 {
        out.push_str(if newlines >= 3 { "\n\n" } else { &"\n\n"[..newlines] });
    }

    out
}
