use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::KeyValueStore;
use super::error::{InvariantViolationSnafu, StorageResult};

/// Process-local store used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock("memory-len").map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self, stage: &'static str) -> StorageResult<MutexGuard<'_, HashMap<String, String>>> {
        match self.entries.lock() {
            Ok(entries) => Ok(entries),
            Err(_) => InvariantViolationSnafu {
                stage,
                details: "memory store lock was poisoned".to_string(),
            }
            .fail(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock("memory-get")?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock("memory-set")?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock("memory-remove")?.remove(key);
        Ok(())
    }
}
