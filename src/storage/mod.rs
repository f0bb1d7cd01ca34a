//! Persistent Key-Value Storage Port
//!
//! Every store mutation is durably written under a fixed string key so a
//! reload reconstructs the same state. This module makes that collaborator
//! an explicit port so business logic never touches a concrete backend and
//! tests can swap in an in-memory one.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;
use async_trait::async_trait;

/// Durable string-keyed value store.
///
/// Semantics are deliberately those of browser storage: last writer wins,
/// no cross-process locking. Concurrent writers from separate processes
/// (the multi-tab case) are not guarded against.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`; absent keys are a no-op.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
