//! JSON-file key-value store.
//!
//! Values live in one JSON object on disk. Reads treat a missing or
//! unreadable file as empty; writes re-read, merge, and flush the whole
//! object before returning, so every mutating call leaves a consistent file
//! behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// A file-backed store holding one JSON object of string values.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store over the given file path.
    ///
    /// The file is created on the first write; it does not need to exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "store file unreadable; treating as empty");
                BTreeMap::new()
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        let mut entries = self.read_entries();
        entries.insert(key.to_owned(), value.to_owned());
        let blob = serde_json::to_string_pretty(&entries)
            .map_err(|error| KeyValueStoreError::write(error.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| KeyValueStoreError::write(error.to_string()))?;
            }
        }
        fs::write(&self.path, blob).map_err(|error| KeyValueStoreError::write(error.to_string()))
    }
}
