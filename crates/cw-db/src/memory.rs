//! In-memory store
//!
//! Implements every store trait against plain collections. Aggregate writes
//! are applied to a copy of the state that replaces the original only when
//! every step succeeded, which gives the same all-or-nothing outcome as the
//! database transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cw_core::traits::Id;
use cw_models::{
    Activity, Comment, Document, NewComment, NewDocument, NewOfficer, NewStatusUpdate, Officer,
    Project, ProjectAggregate, StatusUpdate,
};
use tokio::sync::RwLock;

use crate::repository::{ProjectFilter, RepositoryError, RepositoryResult};
use crate::store::{AggregateWrite, FeedbackStore, OfficerStore, ProjectStore};

#[derive(Debug, Clone, Default)]
struct State {
    next_id: Id,
    projects: Vec<Project>,
    activities: Vec<Activity>,
    documents: Vec<Document>,
    status_updates: Vec<StatusUpdate>,
    comments: Vec<Comment>,
    officers: Vec<Officer>,
}

impl State {
    fn allocate_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn project_exists(&self, id: Id) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    fn insert_document(&mut self, project_id: Id, document: NewDocument, now: DateTime<Utc>) -> Document {
        let created = Document {
            id: self.allocate_id(),
            project_id,
            name: document.name,
            url: document.url,
            is_public: document.is_public,
            storage_key: document.storage_key,
            content_type: document.content_type,
            created_at: now,
        };
        self.documents.push(created.clone());
        created
    }

    fn apply(&mut self, write: AggregateWrite, now: DateTime<Utc>) -> RepositoryResult<Id> {
        if self
            .projects
            .iter()
            .any(|p| p.code == write.project.code && Some(p.id) != write.project_id)
        {
            return Err(RepositoryError::Conflict(
                "A project with this code already exists".to_string(),
            ));
        }

        let project_id = match write.project_id {
            Some(id) => {
                let project = self
                    .projects
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| RepositoryError::not_found("Project", id))?;
                project.apply_draft(write.project, now);
                id
            }
            None => {
                let id = self.allocate_id();
                self.projects.push(Project::from_draft(id, write.project, now));
                id
            }
        };

        for removed in &write.removed_activity_ids {
            let position = self
                .activities
                .iter()
                .position(|a| a.id == *removed && a.project_id == project_id)
                .ok_or_else(|| {
                    RepositoryError::invalid(
                        "removed_activity_ids",
                        format!("activity {} does not belong to project {}", removed, project_id),
                    )
                })?;
            self.activities.remove(position);
        }

        for draft in write.activities {
            match draft.id {
                Some(id) => {
                    let activity = self
                        .activities
                        .iter_mut()
                        .find(|a| a.id == id && a.project_id == project_id)
                        .ok_or_else(|| {
                            RepositoryError::invalid(
                                "activities",
                                format!("activity {} does not belong to project {}", id, project_id),
                            )
                        })?;
                    activity.description = draft.description;
                    activity.start_date = draft.start_date;
                    activity.end_date = draft.end_date;
                }
                None => {
                    let id = self.allocate_id();
                    self.activities.push(Activity {
                        id,
                        project_id,
                        description: draft.description,
                        start_date: draft.start_date,
                        end_date: draft.end_date,
                    });
                }
            }
        }

        for edit in write.document_edits {
            let document = self
                .documents
                .iter_mut()
                .find(|d| d.id == edit.id && d.project_id == project_id)
                .ok_or_else(|| {
                    RepositoryError::invalid(
                        "documents",
                        format!("document {} does not belong to project {}", edit.id, project_id),
                    )
                })?;
            if let Some(name) = edit.name {
                document.name = name;
            }
            if let Some(is_public) = edit.is_public {
                document.is_public = is_public;
            }
        }

        for document in write.new_documents {
            self.insert_document(project_id, document, now);
        }

        Ok(project_id)
    }

    fn aggregate(&self, project: &Project) -> ProjectAggregate {
        ProjectAggregate {
            project: project.clone(),
            activities: self
                .activities
                .iter()
                .filter(|a| a.project_id == project.id)
                .cloned()
                .collect(),
            documents: self
                .documents
                .iter()
                .filter(|d| d.project_id == project.id)
                .cloned()
                .collect(),
        }
    }
}

/// Store backed by process memory, for tests and local experiments
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn project_count(&self) -> usize {
        self.state.read().await.projects.len()
    }

    pub async fn document_count(&self) -> usize {
        self.state.read().await.documents.len()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn save_aggregate(&self, write: AggregateWrite) -> RepositoryResult<Id> {
        let mut state = self.state.write().await;
        let mut staged = state.clone();
        let id = staged.apply(write, Utc::now())?;
        *state = staged;
        Ok(id)
    }

    async fn find_aggregate(&self, id: Id) -> RepositoryResult<Option<ProjectAggregate>> {
        let state = self.state.read().await;
        Ok(state
            .projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| state.aggregate(p)))
    }

    async fn list_aggregates(&self, filter: &ProjectFilter) -> RepositoryResult<Vec<ProjectAggregate>> {
        let state = self.state.read().await;
        let mut projects: Vec<&Project> = state.projects.iter().filter(|p| filter.matches(p)).collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects.into_iter().map(|p| state.aggregate(p)).collect())
    }

    async fn project_exists(&self, id: Id) -> RepositoryResult<bool> {
        Ok(self.state.read().await.project_exists(id))
    }

    async fn find_activity(&self, id: Id) -> RepositoryResult<Option<Activity>> {
        let state = self.state.read().await;
        Ok(state.activities.iter().find(|a| a.id == id).cloned())
    }

    async fn delete_activity(&self, id: Id) -> RepositoryResult<Activity> {
        let mut state = self.state.write().await;
        let position = state
            .activities
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| RepositoryError::not_found("Activity", id))?;
        let removed = state.activities.remove(position);
        for update in state.status_updates.iter_mut() {
            if update.activity_id == Some(id) {
                update.activity_id = None;
            }
        }
        Ok(removed)
    }

    async fn find_document(&self, id: Id) -> RepositoryResult<Option<Document>> {
        let state = self.state.read().await;
        Ok(state.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn insert_document(&self, project_id: Id, document: NewDocument) -> RepositoryResult<Document> {
        let mut state = self.state.write().await;
        if !state.project_exists(project_id) {
            return Err(RepositoryError::not_found("Project", project_id));
        }
        Ok(state.insert_document(project_id, document, Utc::now()))
    }

    async fn set_document_visibility(&self, id: Id, is_public: bool) -> RepositoryResult<Document> {
        let mut state = self.state.write().await;
        let document = state
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| RepositoryError::not_found("Document", id))?;
        document.is_public = is_public;
        Ok(document.clone())
    }

    async fn delete_document(&self, id: Id) -> RepositoryResult<Document> {
        let mut state = self.state.write().await;
        let position = state
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| RepositoryError::not_found("Document", id))?;
        Ok(state.documents.remove(position))
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn create_status_update(&self, update: NewStatusUpdate) -> RepositoryResult<StatusUpdate> {
        let mut state = self.state.write().await;
        if !state.project_exists(update.project_id) {
            return Err(RepositoryError::not_found("Project", update.project_id));
        }
        let created = StatusUpdate {
            id: state.allocate_id(),
            project_id: update.project_id,
            activity_id: update.activity_id,
            problem: update.problem,
            solving: update.solving,
            action: update.action,
            reporter_name: update.reporter_name,
            role: update.role,
            picture_url: update.picture_url,
            created_at: Utc::now(),
        };
        state.status_updates.push(created.clone());
        Ok(created)
    }

    async fn list_status_updates(&self, project_id: Id) -> RepositoryResult<Vec<StatusUpdate>> {
        let state = self.state.read().await;
        let mut updates: Vec<StatusUpdate> = state
            .status_updates
            .iter()
            .filter(|u| u.project_id == project_id)
            .cloned()
            .collect();
        updates.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(updates)
    }

    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment> {
        let mut state = self.state.write().await;
        if !state.project_exists(comment.project_id) {
            return Err(RepositoryError::not_found("Project", comment.project_id));
        }
        let created = Comment {
            id: state.allocate_id(),
            project_id: comment.project_id,
            author_name: comment.author_name,
            content: comment.content,
            created_at: Utc::now(),
        };
        state.comments.push(created.clone());
        Ok(created)
    }

    async fn list_comments(&self, project_id: Id) -> RepositoryResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }
}

#[async_trait]
impl OfficerStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Officer>> {
        let state = self.state.read().await;
        let email = email.trim();
        Ok(state
            .officers
            .iter()
            .find(|o| o.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Officer>> {
        let state = self.state.read().await;
        Ok(state.officers.iter().find(|o| o.id == id).cloned())
    }

    async fn create(&self, officer: NewOfficer) -> RepositoryResult<Officer> {
        let mut state = self.state.write().await;
        let email = officer.email.trim().to_lowercase();
        if state.officers.iter().any(|o| o.email == email) {
            return Err(RepositoryError::Conflict(
                "An officer with this email already exists".to_string(),
            ));
        }
        let created = Officer {
            id: state.allocate_id(),
            email,
            password_hash: officer.password_hash,
            agency: officer.agency,
            last_login_at: None,
            created_at: Utc::now(),
        };
        state.officers.push(created.clone());
        Ok(created)
    }

    async fn record_login(&self, id: Id, at: DateTime<Utc>) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let officer = state
            .officers
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| RepositoryError::not_found("Officer", id))?;
        officer.last_login_at = Some(at);
        Ok(())
    }
}
