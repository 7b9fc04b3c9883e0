//! Durable key-value storage for sessions and task lists.
//!
//! [`KeyValueBackend`] is the raw string seam (in-memory or file backed).
//! [`DurableStore`] wraps a backend with JSON serialization and the
//! fallback rules the stores rely on:
//!
//! 1. `read` never fails. A missing key, an unreadable backend or malformed
//!    content all yield the caller's fallback, and stored content is left
//!    as it is.
//! 2. `write` and `clear` failures are logged and swallowed. There are no
//!    retries; a failing backend loses data rather than blocking callers.

pub mod file;
pub mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use taskdeck_model::codec;

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Key holding the presence-only session marker.
pub const SESSION_KEY: &str = "tdcx_session";

/// Key holding the cached [`UserProfile`](taskdeck_model::user::UserProfile).
pub const USER_KEY: &str = "tdcx_user";

/// Key holding the full task list.
pub const TASKS_KEY: &str = "tdcx_tasks";

/// Errors that can occur inside a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Reading or writing the backing file failed.
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Raw string-keyed storage.
///
/// Implementations include:
/// - [`MemoryBackend`] for tests and throwaway sessions
/// - [`FileBackend`] for one JSON document per key in a directory
pub trait KeyValueBackend: Send + Sync {
    /// Returns the stored text, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the stored text for `key`.
    ///
    /// Readers must observe either the old or the new value, never a mix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be stored.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// JSON adapter over a [`KeyValueBackend`].
#[derive(Debug, Clone, Default)]
pub struct DurableStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> DurableStore<B> {
    /// Wraps the given backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Reads and decodes the value at `key`, or returns `fallback`.
    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.backend.get(key) {
            Ok(Some(text)) => match codec::decode(&text) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(key, error = %err, "stored value is malformed, using fallback");
                    fallback
                }
            },
            Ok(None) => {
                tracing::debug!(key, "no stored value, using fallback");
                fallback
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "storage read failed, using fallback");
                fallback
            }
        }
    }

    /// Encodes `value` and replaces whatever `key` held.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let text = match codec::encode(value) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(key, error = %err, "value could not be encoded, not persisted");
                return;
            }
        };
        if let Err(err) = self.backend.set(key, &text) {
            tracing::warn!(key, error = %err, "storage write failed, value not persisted");
        }
    }

    /// Removes `key`.
    pub fn clear(&self, key: &str) {
        if let Err(err) = self.backend.remove(key) {
            tracing::warn!(key, error = %err, "storage clear failed");
        }
    }
}
