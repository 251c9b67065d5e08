//! Progress reporting traits and types
//!
//! This module defines the events a crawl emits while it runs and the trait
//! interface for sinks that consume them.

use crate::crawler::FetchError;
use std::fmt;
use url::Url;

/// Why a page did not make it to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The fetch failed (after any retries)
    Fetch(FetchError),

    /// The page was fetched but could not be saved
    Persistence(String),

    /// The worker processing the page panicked
    Panicked(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "fetch failed: {}", err),
            Self::Persistence(msg) => write!(f, "save failed: {}", msg),
            Self::Panicked(msg) => write!(f, "worker panicked: {}", msg),
        }
    }
}

/// Events emitted during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A page was fetched successfully
    PageFetched { url: Url },

    /// A page's text was written to storage
    PageSaved { url: Url, filename: String },

    /// A page could not be fetched or saved
    PageFailed { url: Url, reason: FailureReason },

    /// The crawl has stopped; `pages` is the number of pages saved
    CrawlComplete { pages: usize },
}

impl CrawlEvent {
    /// The URL the event concerns, if any
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::PageFetched { url }
            | Self::PageSaved { url, .. }
            | Self::PageFailed { url, .. } => Some(url),
            Self::CrawlComplete { .. } => None,
        }
    }
}

/// Trait for progress sinks
///
/// Sinks are called from every worker, so implementations must be
/// thread-safe and must not block for long.
pub trait ProgressSink: Send + Sync {
    /// Records one event
    fn emit(&self, event: CrawlEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_display() {
        let reason = FailureReason::Fetch(FetchError::Status(404));
        assert_eq!(reason.to_string(), "fetch failed: HTTP status 404");

        let reason = FailureReason::Persistence("disk full".to_string());
        assert_eq!(reason.to_string(), "save failed: disk full");
    }

    #[test]
    fn test_event_url() {
        let url = Url::parse("https://example.com/").unwrap();
        let event = CrawlEvent::PageFetched { url: url.clone() };
        assert_eq!(event.url(), Some(&url));
        assert_eq!(CrawlEvent::CrawlComplete { pages: 1 }.url(), None);
    }
}
