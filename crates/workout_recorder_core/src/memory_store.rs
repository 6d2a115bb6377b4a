//! crates/workout_recorder_core/src/memory_store.rs
//!
//! A `KeyValueStore` that lives in process memory. Useful as a fallback when
//! no durable location is available, and as the store behind tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::ports::{KeyValueStore, PortError, PortResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| PortError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> PortResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> PortResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
