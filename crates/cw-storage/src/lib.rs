//! # cw-storage
//!
//! Object storage for uploaded documents and status update pictures.
//!
//! Callers only ever put named byte blobs with a content type and get back a
//! publicly fetchable URL; [`Storage`] hides where the bytes live.

pub mod keys;
pub mod storage;

pub use keys::{generate_key, sanitize_filename};
pub use storage::{
    FileMetadata, LocalStorage, MemoryStorage, Storage, StorageError, StorageResult,
};
