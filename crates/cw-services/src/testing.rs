//! Test doubles shared by the service tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cw_contracts::ProjectSubmission;
use cw_db::MemoryStore;
use cw_storage::{FileMetadata, MemoryStorage, Storage, StorageError, StorageResult};
use serde_json::json;

/// Memory storage whose puts start failing after a number of successes
pub struct FlakyStorage {
    inner: MemoryStorage,
    successes: usize,
    attempts: AtomicUsize,
}

impl FlakyStorage {
    pub fn failing_after(successes: usize) -> Self {
        Self {
            inner: MemoryStorage::new(),
            successes,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    pub fn put_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<FileMetadata> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.successes {
            return Err(StorageError::BackendError("bucket unavailable".into()));
        }
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    fn url(&self, key: &str) -> String {
        self.inner.url(key)
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// "hello" as a text document
pub const HELLO_BASE64: &str = "data:text/plain;base64,aGVsbG8=";

/// 1x1 transparent PNG
pub const PIXEL_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn submission(value: serde_json::Value) -> ProjectSubmission {
    serde_json::from_value(value).unwrap()
}

pub fn road_repair() -> ProjectSubmission {
    submission(json!({
        "name": "Road repair",
        "code": "BG045",
        "department": "Town Hall",
        "budget": "12,500",
        "activities": [
            { "description": "", "start": "2026-01-01" },
            { "description": "Resurface", "start": "2026-01-01", "end": "2026-02-01" }
        ],
        "documents": []
    }))
}
