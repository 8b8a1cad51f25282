//! In-memory key-value store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use rearm_core::error::StoreError;
use rearm_core::traits::KeyValueStore;
use rearm_core::types::StoreValue;

/// An in-memory key-value store.
///
/// Every batch is applied under a single write guard. Reads and writes can be
/// made to fail on demand to exercise callers' error handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// The entries, indexed by key.
    data: RwLock<HashMap<String, StoreValue>>,

    /// Reject reads with `StoreError::Unavailable`.
    fail_reads: AtomicBool,

    /// Reject writes with `StoreError::Unavailable`.
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoreValue>, StoreError> {
        self.check_read()?;
        let map = self.data.read().await;
        Ok(map.get(key).cloned())
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<StoreValue>>, StoreError> {
        self.check_read()?;
        let map = self.data.read().await;
        Ok(keys.iter().map(|key| map.get(*key).cloned()).collect())
    }

    async fn set(&self, entries: Vec<(String, StoreValue)>) -> Result<(), StoreError> {
        self.check_write()?;
        let mut map = self.data.write().await;
        map.extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.check_write()?;
        let mut map = self.data.write().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
