//! File-backed key-value store.
//!
//! The whole map lives in one JSON document. Each batch is a
//! read-modify-write of that document under a lock, written to a temporary
//! file and renamed over the document so a crash never leaves half a batch
//! on disk.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use rearm_core::error::StoreError;
use rearm_core::traits::KeyValueStore;
use rearm_core::types::StoreValue;

type Document = BTreeMap<String, StoreValue>;

/// Distinguishes temporary files written by this process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-based key-value store
#[derive(Debug)]
pub struct FileStore {
    /// Path of the JSON document
    path: PathBuf,

    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by the document at `path`.
    ///
    /// The file is created on the first write; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!("Store document {:?} does not exist yet", self.path);
                return Ok(Document::new());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Document::new());
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    /// A sibling path no other writer uses, so concurrent writers never
    /// rename each other's half-written files.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), n))
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(document)?;

        // Write atomically using a temporary file
        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, &data).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        // Rename to final path (atomic on most filesystems)
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!("Persisted {} keys to {:?}", document.len(), self.path);
        Ok(())
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<StoreValue>, StoreError> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        Ok(document.get(key).cloned())
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<StoreValue>>, StoreError> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;
        Ok(keys.iter().map(|key| document.get(*key).cloned()).collect())
    }

    async fn set(&self, entries: Vec<(String, StoreValue)>) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        document.extend(entries);
        self.persist(&document).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        let before = document.len();
        for key in keys {
            document.remove(*key);
        }

        // Nothing to remove, nothing to write
        if document.len() == before {
            return Ok(());
        }

        self.persist(&document).await
    }
}
