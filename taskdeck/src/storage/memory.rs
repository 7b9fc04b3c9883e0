//! In-memory storage backend.

use std::collections::HashMap;

use super::{KeyValueBackend, StorageError};

/// Mutex-guarded map of keys to stored text.
///
/// Does not persist anything beyond the lifetime of the struct. Share it
/// through an `Arc` to simulate a process restart over the same storage.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: parking_lot::Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
