//! In-memory page store

use crate::storage::traits::{Persistence, PersistenceError, PersistenceResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Keeps saved pages in a map keyed by filename
///
/// Useful for library callers that post-process pages themselves, and for
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text saved under `filename`
    pub fn get(&self, filename: &str) -> Option<String> {
        self.lock().get(filename).cloned()
    }

    /// Saved filenames in sorted order
    pub fn filenames(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn save(&self, filename: &str, text: &str) -> PersistenceResult<()> {
        if filename.is_empty() {
            return Err(PersistenceError::InvalidFilename(filename.to_string()));
        }
        self.lock().insert(filename.to_string(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_get() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.save("b.md", "two").await.unwrap();
        store.save("a.md", "one").await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a.md").as_deref(), Some("one"));
        assert_eq!(store.filenames(), vec!["a.md", "b.md"]);
    }

    #[tokio::test]
    async fn test_empty_filename_rejected() {
        let store = MemoryStore::new();
        assert!(store.save("", "x").await.is_err());
    }
}
