//! Key-value store trait.
//!
//! Batches passed to `set` and `remove`, and the keys passed to `get_many`,
//! must be applied or read as one unit: no observer may see half of a batch.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::StoreValue;

/// Durable key-value storage used by the registry.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read a single key. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<StoreValue>, StoreError>;

    /// Read several keys in one atomic read.
    ///
    /// The returned vector has one slot per requested key, in order.
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<StoreValue>>, StoreError>;

    /// Write a batch of entries atomically, replacing existing values.
    async fn set(&self, entries: Vec<(String, StoreValue)>) -> Result<(), StoreError>;

    /// Remove a batch of keys atomically. Keys that do not exist are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}
