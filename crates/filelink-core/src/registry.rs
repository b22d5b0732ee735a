//! In-memory file registry.
//!
//! Maps public keys to [`FileRecord`]s for the lifetime of the process. Entries are
//! append-only: there is no update or delete, and nothing is persisted.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::FileRecord;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The key is already registered; carries the record that holds it.
    #[error("Duplicate key: {key}")]
    DuplicateKey {
        key: String,
        existing: Arc<FileRecord>,
    },
}

/// Registry of ingested files.
///
/// Thread-safe and async-compatible using tokio's RwLock. The lock guards a single
/// map operation at a time and is never held across I/O, so cloning the registry
/// into every pipeline is cheap and callers only ever observe fully written records.
#[derive(Clone, Default)]
pub struct FileRegistry {
    entries: Arc<RwLock<HashMap<String, Arc<FileRecord>>>>,
}

impl FileRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own key.
    ///
    /// Fails with `DuplicateKey` when the key is already present; the existing
    /// record is left untouched.
    pub async fn insert(&self, record: FileRecord) -> Result<Arc<FileRecord>, RegistryError> {
        let mut entries = self.entries.write().await;

        match entries.entry(record.key.clone()) {
            Entry::Occupied(existing) => Err(RegistryError::DuplicateKey {
                key: record.key,
                existing: existing.get().clone(),
            }),
            Entry::Vacant(slot) => {
                let record = Arc::new(record);
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    /// Get a record by key
    pub async fn lookup(&self, key: &str) -> Option<Arc<FileRecord>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Number of registered files
    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.size().await == 0
    }
}
