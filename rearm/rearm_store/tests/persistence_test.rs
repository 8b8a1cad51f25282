//! Integration tests for rearm_store backends.

use std::sync::Arc;

use rearm_core::types::StoreValue;
use rearm_store::{FileStore, KeyValueStore, MemoryStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("registry.json");

    {
        let store = FileStore::new(&path);
        store
            .set(vec![
                ("service".to_string(), StoreValue::from("svcA")),
                ("delay".to_string(), StoreValue::from(45)),
            ])
            .await
            .unwrap();
    }

    // A fresh instance stands in for a process restart
    let reopened = FileStore::new(&path);
    assert_eq!(
        reopened.get_many(&["service", "delay"]).await.unwrap(),
        vec![Some(StoreValue::from("svcA")), Some(StoreValue::from(45))]
    );
}

#[tokio::test]
async fn test_file_store_overwrites_values() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path().join("registry.json"));

    store
        .set(vec![("service".to_string(), StoreValue::from("svcA"))])
        .await
        .unwrap();
    store
        .set(vec![("service".to_string(), StoreValue::from("svcB"))])
        .await
        .unwrap();

    assert_eq!(
        store.get("service").await.unwrap(),
        Some(StoreValue::from("svcB"))
    );
}

async fn assert_batches_never_interleave<S: KeyValueStore>(store: Arc<S>) {
    let mut writers = Vec::new();
    for i in 0..16i64 {
        let store = store.clone();
        writers.push(tokio::spawn(async move {
            store
                .set(vec![
                    ("service".to_string(), StoreValue::from(format!("svc{}", i))),
                    ("delay".to_string(), StoreValue::from(i)),
                ])
                .await
                .unwrap();
        }));
    }

    for writer in writers {
        writer.await.unwrap();
    }

    let values = store.get_many(&["service", "delay"]).await.unwrap();
    let service = values[0].as_ref().and_then(|v| v.as_str()).unwrap();
    let delay = values[1].as_ref().and_then(|v| v.as_integer()).unwrap();
    assert_eq!(service, format!("svc{}", delay));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_store_batches_are_atomic() {
    assert_batches_never_interleave(Arc::new(MemoryStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_store_batches_are_atomic() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::new(temp_dir.path().join("registry.json")));
    assert_batches_never_interleave(store).await;
}
