//! Storage Abstraction
//!
//! Provides a unified interface for file storage backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use cw_core::error::CwError;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for CwError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => CwError::NotFound {
                entity: "File",
                field: "key",
                value: key,
            },
            other => CwError::Storage(other.to_string()),
        }
    }
}

/// File metadata from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Content type (MIME)
    pub content_type: String,
    /// SHA256 digest
    pub digest: String,
}

impl FileMetadata {
    fn describe(data: &[u8], content_type: &str) -> Self {
        Self {
            size: data.len() as u64,
            content_type: content_type.to_string(),
            digest: calculate_digest(data),
        }
    }
}

/// Hex encoded SHA256 of the content
pub fn calculate_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Storage trait - unified interface for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store data under `key` with the given content type
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<FileMetadata>;

    /// Retrieve data by key
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Delete data by key; deleting a missing key succeeds
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if key exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Publicly fetchable URL of a stored key
    fn url(&self, key: &str) -> String;

    /// Get storage name for logging
    fn name(&self) -> &str;
}

/// Reject keys that could escape the storage root
fn check_key(key: &str) -> StorageResult<()> {
    let escapes = key.is_empty()
        || key.starts_with('/')
        || key.starts_with('\\')
        || key.split(['/', '\\']).any(|part| part == "..");
    if escapes {
        return Err(StorageError::InvalidPath(key.to_string()));
    }
    Ok(())
}

/// Local filesystem storage, served by the HTTP layer under `base_url`
pub struct LocalStorage {
    /// Root directory for storage
    root: PathBuf,
    /// Base URL for generating URLs
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if needed
    pub async fn init(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn resolve_path(&self, key: &str) -> StorageResult<PathBuf> {
        check_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    #[instrument(skip(self, data), fields(storage = "local", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<FileMetadata> {
        let path = self.resolve_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let metadata = FileMetadata::describe(&data, content_type);

        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        debug!(path = ?path, digest = %metadata.digest, "File stored");
        Ok(metadata)
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.resolve_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = ?path, "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.resolve_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// In-memory storage for testing
pub struct MemoryStorage {
    files: RwLock<HashMap<String, (Bytes, FileMetadata)>>,
    base_url: String,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            base_url: "/memory".to_string(),
        }
    }

    /// Stored keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn metadata(&self, key: &str) -> StorageResult<FileMetadata> {
        self.files
            .read()
            .await
            .get(key)
            .map(|(_, meta)| meta.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<FileMetadata> {
        check_key(key)?;
        let metadata = FileMetadata::describe(&data, content_type);
        self.files
            .write()
            .await
            .insert(key.to_string(), (data, metadata.clone()));
        Ok(metadata)
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.files
            .read()
            .await
            .get(key)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.files.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.files.read().await.contains_key(key))
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
