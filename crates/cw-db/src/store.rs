//! Store traits
//!
//! Services talk to persistence only through these traits. The PostgreSQL
//! repositories implement them for production, [`crate::MemoryStore`] for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cw_core::traits::Id;
use cw_models::{
    Activity, ActivityDraft, Comment, Document, DocumentEdit, NewComment, NewDocument, NewOfficer,
    NewStatusUpdate, Officer, ProjectAggregate, ProjectDraft, StatusUpdate,
};

use crate::repository::{ProjectFilter, RepositoryResult};

/// Everything written for one create or update of a project, applied
/// all-or-nothing.
///
/// Order of application: project row, activity removals, activity upserts
/// (in list order), document edits, new document rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateWrite {
    /// `None` creates a new project
    pub project_id: Option<Id>,
    pub project: ProjectDraft,
    /// `id` set updates that activity of this project, unset inserts
    pub activities: Vec<ActivityDraft>,
    pub removed_activity_ids: Vec<Id>,
    pub document_edits: Vec<DocumentEdit>,
    pub new_documents: Vec<NewDocument>,
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Write a project with its children in one transaction; returns the project id
    async fn save_aggregate(&self, write: AggregateWrite) -> RepositoryResult<Id>;

    async fn find_aggregate(&self, id: Id) -> RepositoryResult<Option<ProjectAggregate>>;

    /// Newest first, children nested, all documents included
    async fn list_aggregates(&self, filter: &ProjectFilter) -> RepositoryResult<Vec<ProjectAggregate>>;

    async fn project_exists(&self, id: Id) -> RepositoryResult<bool>;

    async fn find_activity(&self, id: Id) -> RepositoryResult<Option<Activity>>;

    /// Returns the deleted row
    async fn delete_activity(&self, id: Id) -> RepositoryResult<Activity>;

    async fn find_document(&self, id: Id) -> RepositoryResult<Option<Document>>;

    async fn insert_document(&self, project_id: Id, document: NewDocument) -> RepositoryResult<Document>;

    async fn set_document_visibility(&self, id: Id, is_public: bool) -> RepositoryResult<Document>;

    /// Returns the deleted row, so its stored object can be removed
    async fn delete_document(&self, id: Id) -> RepositoryResult<Document>;
}

/// Append-only status updates and comments
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn create_status_update(&self, update: NewStatusUpdate) -> RepositoryResult<StatusUpdate>;

    /// Newest first
    async fn list_status_updates(&self, project_id: Id) -> RepositoryResult<Vec<StatusUpdate>>;

    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment>;

    /// Newest first
    async fn list_comments(&self, project_id: Id) -> RepositoryResult<Vec<Comment>>;
}

#[async_trait]
pub trait OfficerStore: Send + Sync {
    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Officer>>;

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Officer>>;

    /// Fails with `Conflict` when the email is taken
    async fn create(&self, officer: NewOfficer) -> RepositoryResult<Officer>;

    async fn record_login(&self, id: Id, at: DateTime<Utc>) -> RepositoryResult<()>;
}
