//! File-backed storage: one JSON document per key inside a data directory.
//!
//! Key `k` lives at `<dir>/k.json`. Writes go to a hidden temporary sibling
//! first and are renamed over the target, so a reader never sees a partial
//! document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueBackend, StorageError};

/// File extension for stored documents.
const DOCUMENT_EXTENSION: &str = "json";

/// Directory-backed [`KeyValueBackend`].
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a key to its document path.
    ///
    /// Keys must be non-empty, must not start with `.` and may only contain
    /// ASCII letters, digits, `_`, `-` and `.`.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{DOCUMENT_EXTENSION}")))
    }

    /// Temporary path used while replacing `key`. Starts with `.`, so it can
    /// never collide with a valid key's document.
    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.{DOCUMENT_EXTENSION}.tmp"))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let tmp = self.temp_path_for(key);
        std::fs::write(&tmp, value).map_err(|e| StorageError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StorageError::Io { path, source: e }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }
}
