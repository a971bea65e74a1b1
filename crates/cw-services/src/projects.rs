//! Project aggregate service
//!
//! Create and update run the same flow:
//!
//! 1. validate the whole submission (nothing is touched on failure)
//! 2. store uploaded document bytes
//! 3. write project, activities and document rows in one store transaction
//! 4. on failure of 3, discard the objects stored in 2

use std::sync::Arc;

use chrono::Utc;
use cw_contracts::projects::DOCUMENT_NAME_MAX;
use cw_contracts::{
    Contract, CreateProjectContract, DecodedFile, ProjectSubmission, SubmissionLimits,
    UpdateProjectContract, ValidatedSubmission,
};
use cw_core::error::{CwError, CwResult};
use cw_core::traits::Id;
use cw_db::{AggregateWrite, ProjectFilter, ProjectStore};
use cw_models::{Activity, Document, NewDocument, ProjectAggregate};
use cw_storage::Storage;
use tracing::{info, instrument, warn};

use crate::documents::{DocumentWriter, DOCUMENTS_PREFIX};
use crate::statistics::{self, ProjectStatistics};

/// A single file sent as multipart form data
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpload {
    pub file: DecodedFile,
    /// Display name; the file name when absent
    pub name: Option<String>,
    pub is_public: bool,
}

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
    documents: DocumentWriter,
    limits: SubmissionLimits,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ProjectStore>, storage: Arc<dyn Storage>, limits: SubmissionLimits) -> Self {
        Self {
            store,
            documents: DocumentWriter::new(storage),
            limits,
        }
    }

    pub fn limits(&self) -> SubmissionLimits {
        self.limits
    }

    /// Create a project with its activities and documents
    #[instrument(skip(self, submission))]
    pub async fn create(&self, submission: ProjectSubmission) -> CwResult<ProjectAggregate> {
        let validated = CreateProjectContract::new(self.limits).validate(submission)?;
        let id = self.write(None, validated).await?;
        info!(project_id = id, "Project created");
        self.get(id).await
    }

    /// Update a project; activities and documents are upserted by id.
    /// Activities missing from the submission are kept unless listed in
    /// `removed_activity_ids`.
    #[instrument(skip(self, submission))]
    pub async fn update(&self, id: Id, submission: ProjectSubmission) -> CwResult<ProjectAggregate> {
        let validated = UpdateProjectContract::new(self.limits).validate(submission)?;
        if !self.store.project_exists(id).await? {
            return Err(CwError::not_found("Project", id));
        }
        self.write(Some(id), validated).await?;
        info!(project_id = id, "Project updated");
        self.get(id).await
    }

    async fn write(&self, project_id: Option<Id>, validated: ValidatedSubmission) -> CwResult<Id> {
        let staged = self.documents.stage(validated.documents).await?;

        let write = AggregateWrite {
            project_id,
            project: validated.project,
            activities: validated.activities,
            removed_activity_ids: validated.removed_activity_ids,
            document_edits: staged.edits,
            new_documents: staged.new_documents,
        };

        match self.store.save_aggregate(write).await {
            Ok(id) => Ok(id),
            Err(err) => {
                if !staged.uploaded_keys.is_empty() {
                    warn!(
                        objects = staged.uploaded_keys.len(),
                        error = %err,
                        "Project write failed, discarding uploaded documents"
                    );
                    self.documents.discard(&staged.uploaded_keys).await;
                }
                Err(err.into())
            }
        }
    }

    /// Admin view: every document included
    pub async fn get(&self, id: Id) -> CwResult<ProjectAggregate> {
        self.store
            .find_aggregate(id)
            .await?
            .ok_or_else(|| CwError::not_found("Project", id))
    }

    /// Citizen view: public documents only
    pub async fn get_public(&self, id: Id) -> CwResult<ProjectAggregate> {
        Ok(self.get(id).await?.public_view())
    }

    pub async fn list(&self, filter: &ProjectFilter) -> CwResult<Vec<ProjectAggregate>> {
        Ok(self.store.list_aggregates(filter).await?)
    }

    pub async fn list_public(&self, filter: &ProjectFilter) -> CwResult<Vec<ProjectAggregate>> {
        Ok(self
            .list(filter)
            .await?
            .into_iter()
            .map(ProjectAggregate::public_view)
            .collect())
    }

    pub async fn statistics(&self) -> CwResult<ProjectStatistics> {
        let aggregates = self.list(&ProjectFilter::default()).await?;
        Ok(statistics::compute(&aggregates, Utc::now().date_naive()))
    }

    #[instrument(skip(self))]
    pub async fn delete_activity(&self, id: Id) -> CwResult<Activity> {
        let activity = self.store.delete_activity(id).await?;
        info!(activity_id = id, project_id = activity.project_id, "Activity deleted");
        Ok(activity)
    }

    /// Store one file and attach it to an existing project
    #[instrument(skip(self, upload), fields(file_name = %upload.file.file_name))]
    pub async fn attach_document(&self, project_id: Id, upload: DocumentUpload) -> CwResult<Document> {
        let size = upload.file.size();
        if size == 0 {
            return Err(CwError::invalid("file", "is empty"));
        }
        if size > self.limits.max_document_size {
            return Err(CwError::PayloadTooLarge {
                size,
                max: self.limits.max_document_size,
            });
        }
        let name = upload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&upload.file.file_name)
            .to_string();
        if name.chars().count() > DOCUMENT_NAME_MAX {
            return Err(CwError::invalid(
                "name",
                format!("is too long (maximum is {} characters)", DOCUMENT_NAME_MAX),
            ));
        }
        if !self.store.project_exists(project_id).await? {
            return Err(CwError::not_found("Project", project_id));
        }

        let stored = self.documents.upload(DOCUMENTS_PREFIX, upload.file).await?;
        let document = NewDocument {
            name,
            url: stored.url,
            is_public: upload.is_public,
            storage_key: Some(stored.key.clone()),
            content_type: Some(stored.content_type),
        };

        match self.store.insert_document(project_id, document).await {
            Ok(created) => {
                info!(project_id, document_id = created.id, "Document attached");
                Ok(created)
            }
            Err(err) => {
                self.documents.discard(&[stored.key]).await;
                Err(err.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn set_document_visibility(&self, id: Id, is_public: bool) -> CwResult<Document> {
        let document = self.store.set_document_visibility(id, is_public).await?;
        info!(document_id = id, is_public, "Document visibility changed");
        Ok(document)
    }

    /// Delete the row, then the stored object if we own one
    #[instrument(skip(self))]
    pub async fn delete_document(&self, id: Id) -> CwResult<Document> {
        let document = self.store.delete_document(id).await?;
        if let Some(key) = &document.storage_key {
            self.documents.discard(std::slice::from_ref(key)).await;
        }
        info!(document_id = id, project_id = document.project_id, "Document deleted");
        Ok(document)
    }
}
