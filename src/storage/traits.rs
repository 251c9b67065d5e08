//! Persistence traits and error types
//!
//! This module defines the trait interface for page stores and the
//! associated error type.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while saving a page
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error writing {filename}: {source}")]
    Io {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Store rejected {filename}: {reason}")]
    Rejected { filename: String, reason: String },
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Trait for page stores
///
/// A store receives the extracted text of every saved page together with the
/// filename chosen for it. Implementations must be thread-safe; failures are
/// reported per page and never abort the crawl.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Saves the text of one page under `filename`
    ///
    /// # Arguments
    ///
    /// * `filename` - Unique, filesystem-safe name (including extension)
    /// * `text` - Extracted page text
    async fn save(&self, filename: &str, text: &str) -> PersistenceResult<()>;
}
