//! In-memory key-value store for tests and ephemeral sessions.

use std::collections::HashMap;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// A process-local store; nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
