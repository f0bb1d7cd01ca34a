//! In-memory storage backend
//!
//! Backs the storage port with a `DashMap`, which allows concurrent access
//! without external Mutexes. Used as the default backend in tests and for
//! hosts that do not need reload persistence.

use super::StorageBackend;
use crate::error::StorageError;
use async_trait::async_trait;
use dashmap::DashMap;

/// Volatile `DashMap`-backed store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
