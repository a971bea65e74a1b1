//! Document writer
//!
//! Puts uploaded bytes into object storage and turns validated document
//! inputs into rows for the aggregate write. Objects are stored before any row
//! exists; when a later step of the same request fails, [`DocumentWriter::discard`]
//! removes what this request uploaded.

use std::sync::Arc;

use bytes::Bytes;
use cw_contracts::{DecodedFile, DocumentInput};
use cw_core::error::CwResult;
use cw_models::{DocumentEdit, NewDocument};
use cw_storage::{generate_key, Storage};
use tracing::{debug, instrument, warn};

/// Key prefix of project documents
pub const DOCUMENTS_PREFIX: &str = "documents";

/// Key prefix of status update pictures
pub const PICTURES_PREFIX: &str = "status-updates";

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub content_type: String,
}

/// Document inputs of one submission, resolved against storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedDocuments {
    pub edits: Vec<DocumentEdit>,
    pub new_documents: Vec<NewDocument>,
    /// Keys uploaded while staging, to discard if the write fails
    pub uploaded_keys: Vec<String>,
}

#[derive(Clone)]
pub struct DocumentWriter {
    storage: Arc<dyn Storage>,
}

impl DocumentWriter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Store one decoded file under a fresh key
    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.size()))]
    pub async fn upload(&self, prefix: &str, file: DecodedFile) -> CwResult<StoredObject> {
        let key = generate_key(prefix, &file.file_name);
        let metadata = self
            .storage
            .put(&key, Bytes::from(file.bytes), &file.content_type)
            .await?;

        debug!(
            key = %key,
            backend = self.storage.name(),
            digest = %metadata.digest,
            "Object stored"
        );

        Ok(StoredObject {
            url: self.storage.url(&key),
            content_type: metadata.content_type,
            key,
        })
    }

    /// Upload every new file and sort the inputs into edits and new rows.
    ///
    /// Stops at the first failing upload; objects uploaded before it are
    /// discarded and the storage error is returned.
    pub async fn stage(&self, inputs: Vec<DocumentInput>) -> CwResult<StagedDocuments> {
        let mut staged = StagedDocuments::default();

        for input in inputs {
            match input {
                DocumentInput::Edit(edit) => staged.edits.push(edit),
                DocumentInput::Reference(document) => staged.new_documents.push(document),
                DocumentInput::Upload { file, name, is_public } => {
                    let stored = match self.upload(DOCUMENTS_PREFIX, file).await {
                        Ok(stored) => stored,
                        Err(err) => {
                            self.discard(&staged.uploaded_keys).await;
                            return Err(err);
                        }
                    };
                    staged.uploaded_keys.push(stored.key.clone());
                    staged.new_documents.push(NewDocument {
                        name,
                        url: stored.url,
                        is_public,
                        storage_key: Some(stored.key),
                        content_type: Some(stored.content_type),
                    });
                }
            }
        }

        Ok(staged)
    }

    /// Best-effort removal of objects; failures are logged only
    pub async fn discard(&self, keys: &[String]) {
        for key in keys {
            match self.storage.delete(key).await {
                Ok(()) => debug!(key = %key, "Discarded uploaded object"),
                Err(err) => warn!(key = %key, error = %err, "Failed to discard uploaded object"),
            }
        }
    }
}
