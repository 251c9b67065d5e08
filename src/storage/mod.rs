//! Storage module for persisting extracted pages
//!
//! This module handles everything between "the page has text" and "the text
//! is on disk":
//! - Mapping URLs to unique, filesystem-safe filenames
//! - Writing pages into the output directory
//! - An in-memory store for library use and tests

mod directory;
mod filename;
mod memory;
mod traits;

pub use directory::DirectoryStore;
pub use filename::{sanitize_stem, stem_for, FilenameGenerator, EXTENSION, MAX_STEM_BYTES};
pub use memory::MemoryStore;
pub use traits::{Persistence, PersistenceError, PersistenceResult};

use crate::ConfigError;
use std::path::Path;

/// Opens the output directory and a filename generator that will not reuse
/// any name already present in it
///
/// # Arguments
///
/// * `path` - Output directory (created if missing)
///
/// # Returns
///
/// * `Ok((DirectoryStore, FilenameGenerator))` - Ready-to-use store and names
/// * `Err(ConfigError)` - Directory is not usable
pub fn open_output(path: &Path) -> Result<(DirectoryStore, FilenameGenerator), ConfigError> {
    let store = DirectoryStore::open(path)?;
    let names = FilenameGenerator::with_reserved(store.existing_filenames());
    Ok((store, names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use url::Url;

    #[test]
    fn test_open_output_reserves_existing_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.md"), "old run").unwrap();

        let (_store, names) = open_output(temp.path()).unwrap();
        let root = Url::parse("https://example.com/").unwrap();
        assert_eq!(names.filename_for(&root), "index_1.md");
    }
}
