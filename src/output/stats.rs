//! Crawl statistics and the final run report
//!
//! This module provides the counters a crawl accumulates while it runs and
//! the report returned (and printed) once it has stopped.

use crate::state::{EngineState, TargetState};
use crate::url::Classification;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages fetched successfully (saved or not)
    pub pages_fetched: usize,

    /// Pages whose text was written to storage
    pub pages_saved: usize,

    /// Pages that failed to fetch or save
    pub pages_failed: usize,

    /// Pages fetched but not saved
    pub pages_skipped: usize,

    /// Links extracted from fetched pages that normalized to a URL
    pub links_seen: usize,

    /// Links added to the frontier
    pub links_enqueued: usize,

    /// Links rejected because their host differs from the root
    pub links_out_of_domain: usize,

    /// Links rejected by an exclusion rule
    pub links_excluded: usize,

    /// Retry attempts made after transient fetch failures
    pub retries: usize,
}

impl CrawlStatistics {
    /// Counts one page in its terminal state
    pub fn record_page(&mut self, state: TargetState) {
        match state {
            TargetState::Succeeded => self.pages_saved += 1,
            TargetState::Failed => self.pages_failed += 1,
            TargetState::Skipped => self.pages_skipped += 1,
            TargetState::Pending | TargetState::InFlight => {}
        }
    }

    /// Counts one link rejected by the scope
    pub fn record_rejected(&mut self, classification: Classification) {
        match classification {
            Classification::OutOfDomain => self.links_out_of_domain += 1,
            Classification::Excluded => self.links_excluded += 1,
            Classification::InScope => {}
        }
    }

    /// Pages that reached a terminal state
    pub fn pages_processed(&self) -> usize {
        self.pages_saved + self.pages_failed + self.pages_skipped
    }

    /// Returns the save rate as a percentage of processed pages
    pub fn success_rate(&self) -> f64 {
        let processed = self.pages_processed();
        if processed == 0 {
            return 0.0;
        }
        (self.pages_saved as f64 / processed as f64) * 100.0
    }
}

/// A page written to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    pub url: String,
    pub filename: String,
}

/// A page that could not be fetched or saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub reason: String,
}

/// Summary of a finished crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Normalized root URL
    pub root_url: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Engine state when the report was produced
    pub engine_state: EngineState,

    /// True if the run stopped because of a deadline or stop signal
    pub cancelled: bool,

    pub statistics: CrawlStatistics,

    /// Saved pages in completion order
    pub saved: Vec<SavedPage>,

    /// Failed pages in completion order
    pub failures: Vec<PageFailure>,

    /// Every enqueued URL in discovery order (root first)
    pub discovered: Vec<String>,
}

impl CrawlReport {
    /// Number of pages written to storage
    pub fn pages_saved(&self) -> usize {
        self.statistics.pages_saved
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Looks up the filename a URL was saved under
    pub fn filename_for(&self, url: &str) -> Option<&str> {
        self.saved
            .iter()
            .find(|page| page.url == url)
            .map(|page| page.filename.as_str())
    }
}

/// Prints the report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &CrawlReport) {
    let stats = &report.statistics;

    println!("=== Crawl Report ===\n");

    println!("Run:");
    println!("  Root: {}", report.root_url);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!("  Duration: {:.1}s", report.duration_seconds());
    if report.cancelled {
        println!("  Stopped early (deadline or interrupt)");
    }
    println!();

    println!("Pages:");
    println!("  Discovered: {}", report.discovered.len());
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Saved: {}", stats.pages_saved);
    println!("  Skipped: {}", stats.pages_skipped);
    println!("  Failed: {}", stats.pages_failed);
    if stats.retries > 0 {
        println!("  Retries: {}", stats.retries);
    }
    println!();

    println!("Links:");
    println!("  Seen: {}", stats.links_seen);
    println!("  Enqueued: {}", stats.links_enqueued);
    println!("  Out of domain: {}", stats.links_out_of_domain);
    println!("  Excluded: {}", stats.links_excluded);
    println!();

    if !report.failures.is_empty() {
        println!("Failures ({}):", report.failures.len());
        for failure in report.failures.iter().take(20) {
            println!("  - {}: {}", failure.url, failure.reason);
        }
        if report.failures.len() > 20 {
            println!("  ... and {} more", report.failures.len() - 20);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages saved)",
        stats.success_rate(),
        stats.pages_saved,
        stats.pages_processed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_record_page() {
        let mut stats = CrawlStatistics::default();
        stats.record_page(TargetState::Succeeded);
        stats.record_page(TargetState::Succeeded);
        stats.record_page(TargetState::Failed);
        stats.record_page(TargetState::Skipped);
        stats.record_page(TargetState::InFlight);

        assert_eq!(stats.pages_saved, 2);
        assert_eq!(stats.pages_failed, 1);
        assert_eq!(stats.pages_skipped, 1);
        assert_eq!(stats.pages_processed(), 4);
    }

    #[test]
    fn test_record_rejected() {
        let mut stats = CrawlStatistics::default();
        stats.record_rejected(Classification::OutOfDomain);
        stats.record_rejected(Classification::Excluded);
        stats.record_rejected(Classification::Excluded);
        stats.record_rejected(Classification::InScope);

        assert_eq!(stats.links_out_of_domain, 1);
        assert_eq!(stats.links_excluded, 2);
    }

    #[test]
    fn test_success_rate() {
        let stats = CrawlStatistics {
            pages_saved: 8,
            pages_failed: 2,
            ..Default::default()
        };
        assert!((stats.success_rate() - 80.0).abs() < 0.01);
        assert_eq!(CrawlStatistics::default().success_rate(), 0.0);
    }

    #[test]
    fn test_report_helpers() {
        let started_at = Utc::now();
        let report = CrawlReport {
            root_url: "https://example.com/".to_string(),
            started_at,
            finished_at: started_at + Duration::milliseconds(1500),
            engine_state: EngineState::Terminated,
            cancelled: false,
            statistics: CrawlStatistics {
                pages_saved: 1,
                ..Default::default()
            },
            saved: vec![SavedPage {
                url: "https://example.com/".to_string(),
                filename: "index.md".to_string(),
            }],
            failures: vec![],
            discovered: vec!["https://example.com/".to_string()],
        };

        assert_eq!(report.pages_saved(), 1);
        assert!((report.duration_seconds() - 1.5).abs() < 0.001);
        assert_eq!(report.filename_for("https://example.com/"), Some("index.md"));
        assert_eq!(report.filename_for("https://example.com/a"), None);
    }
}
