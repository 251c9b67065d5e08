//! Site-Harvest: a same-domain text harvester
//!
//! This crate crawls a website from a root URL, follows links that stay on the
//! root's domain, converts each page to Markdown-like text, and writes the
//! text to uniquely named files, bounded by a page budget.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Harvest operations
///
/// Only fatal conditions surface here. Per-page failures are reported through
/// the progress sink and never abort a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Root URL {url} could not be fetched: {reason}")]
    RootUnreachable { url: String, reason: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid root URL: {0}")]
    InvalidUrl(String),

    #[error("Output directory {path} is not usable: {reason}")]
    OutputDir { path: String, reason: String },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Crawler;
pub use output::{CrawlEvent, CrawlReport};
pub use state::{EngineState, TargetState};
pub use url::{normalize, Classification, CrawlScope, NormalizePolicy};
