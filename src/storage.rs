//! The persistence port: a string key-value surface the store writes through.
//!
//! A browser deployment persists to `window.localStorage`; the surface is an
//! injected trait so the core is testable without a browser. Two adapters
//! ship with the crate:
//!
//! - [`MemoryStorage`] — a shared in-memory map. Cloning the handle shares
//!   the underlying map, the way every tab sees one `localStorage`.
//! - [`FileStorage`] — one `<key>.json` file per key in a directory.

use crate::error::StorageError;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// External key-value surface the match record is persisted to.
///
/// `get` distinguishes "absent" from failure; the store treats an absent
/// value as the default empty record.
pub trait StateStorage {
    /// Reads the value under `key`, or `None` when no value exists yet.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage backed by a shared map.
///
/// Clones share the same map, so two stores built over clones of one
/// `MemoryStorage` model two tabs over one `localStorage` — including the
/// lost-update race between their read-modify-write cycles.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::new(key, std::io::Error::other("storage lock poisoned")))?;
        Ok(values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::new(key, std::io::Error::other("storage lock poisoned")))?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// File-backed storage: each key maps to `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a storage rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the directory cannot be created.
    #[instrument]
    pub fn new(dir: impl Into<PathBuf> + std::fmt::Debug) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StorageError::new(dir.display().to_string(), e))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "no persisted value");
                Ok(None)
            }
            Err(e) => Err(StorageError::new(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path(key), value).map_err(|e| StorageError::new(key, e))
    }
}
