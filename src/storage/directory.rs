//! Directory-backed page store
//!
//! Writes each saved page as a file in a single output directory.

use crate::storage::traits::{Persistence, PersistenceError, PersistenceResult};
use crate::ConfigError;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROBE_FILE: &str = ".site-harvest-probe";

/// Stores pages as files under one directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens (creating if needed) the output directory
    ///
    /// The directory is checked for writability up front so that an unusable
    /// output location is reported before any page is fetched.
    ///
    /// # Returns
    ///
    /// * `Ok(DirectoryStore)` - Directory exists and is writable
    /// * `Err(ConfigError::OutputDir)` - Directory could not be created or written
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let root = path.as_ref().to_path_buf();
        let output_error = |reason: String| ConfigError::OutputDir {
            path: root.display().to_string(),
            reason,
        };

        fs::create_dir_all(&root).map_err(|e| output_error(e.to_string()))?;

        let probe = root.join(PROBE_FILE);
        fs::write(&probe, b"").map_err(|e| output_error(e.to_string()))?;
        fs::remove_file(&probe).map_err(|e| output_error(e.to_string()))?;

        debug!("Output directory ready: {}", root.display());
        Ok(Self { root })
    }

    /// The directory pages are written to
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Names of regular files already present in the directory
    pub fn existing_filenames(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect()
    }
}

#[async_trait]
impl Persistence for DirectoryStore {
    async fn save(&self, filename: &str, text: &str) -> PersistenceResult<()> {
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename == "."
            || filename == ".."
        {
            return Err(PersistenceError::InvalidFilename(filename.to_string()));
        }

        let path = self.root.join(filename);
        tokio::fs::write(&path, text)
            .await
            .map_err(|source| PersistenceError::Io {
                filename: filename.to_string(),
                source,
            })?;

        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}
