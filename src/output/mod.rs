//! Output module for page text, progress events and crawl reports
//!
//! This module handles:
//! - Converting fetched HTML into the Markdown-like text that gets saved
//! - Emitting progress events while the crawl runs
//! - Summarising a finished run

mod markdown;
mod progress;
pub mod stats;
mod traits;

pub use markdown::{html_to_markdown, MarkdownExtractor, TextExtractor, DEFAULT_MIN_TEXT_LENGTH};
pub use progress::{ChannelProgress, NullProgress, TracingProgress};
pub use stats::{print_report, CrawlReport, CrawlStatistics, PageFailure, SavedPage};
pub use traits::{CrawlEvent, FailureReason, ProgressSink};
