//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with optional retries
//! - HTML parsing and link extraction
//! - The shared frontier and page budget
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{CrawlResult, Crawler};
pub use fetcher::{
    build_http_client, is_html_content_type, FetchError, FetchedPage, HttpFetcher, PageFetcher,
    MAX_REDIRECTS,
};
pub use parser::{extract_links, HtmlLinkExtractor, LinkExtractor};
pub use scheduler::{Completion, CrawlTarget, EnqueueOutcome, Frontier};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Open the output directory
/// 3. Build the HTTP client
/// 4. Fetch pages, save their text and follow same-domain links
/// 5. Return the run report
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(CrawlError)` - Crawl could not start, or the root was unreachable
pub async fn crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    Crawler::new(config)?.run().await
}
