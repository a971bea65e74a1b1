//! Status updates and citizen comments

use std::sync::Arc;

use cw_contracts::{CommentContract, CommentInput, Contract, StatusUpdateContract, StatusUpdateInput};
use cw_core::error::{CwError, CwResult};
use cw_core::traits::Id;
use cw_db::{FeedbackStore, ProjectStore};
use cw_models::{Comment, StatusUpdate};
use cw_storage::Storage;
use tracing::{info, instrument};

use crate::documents::{DocumentWriter, PICTURES_PREFIX};

#[derive(Clone)]
pub struct FeedbackService {
    projects: Arc<dyn ProjectStore>,
    feedback: Arc<dyn FeedbackStore>,
    pictures: DocumentWriter,
    max_picture_size: usize,
}

impl FeedbackService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        feedback: Arc<dyn FeedbackStore>,
        storage: Arc<dyn Storage>,
        max_picture_size: usize,
    ) -> Self {
        Self {
            projects,
            feedback,
            pictures: DocumentWriter::new(storage),
            max_picture_size,
        }
    }

    async fn ensure_project(&self, project_id: Id) -> CwResult<()> {
        if self.projects.project_exists(project_id).await? {
            Ok(())
        } else {
            Err(CwError::not_found("Project", project_id))
        }
    }

    /// Record a status update, storing its picture first when one is sent
    #[instrument(skip(self, input))]
    pub async fn create_status_update(&self, project_id: Id, input: StatusUpdateInput) -> CwResult<StatusUpdate> {
        let validated = StatusUpdateContract::new(project_id, self.max_picture_size).validate(input)?;
        self.ensure_project(project_id).await?;

        if let Some(activity_id) = validated.update.activity_id {
            let belongs = self
                .projects
                .find_activity(activity_id)
                .await?
                .is_some_and(|a| a.project_id == project_id);
            if !belongs {
                return Err(CwError::invalid(
                    "activity_id",
                    format!("activity {} does not belong to project {}", activity_id, project_id),
                ));
            }
        }

        let mut update = validated.update;
        let picture_key = match validated.picture {
            Some(file) => {
                let stored = self.pictures.upload(PICTURES_PREFIX, file).await?;
                update.picture_url = Some(stored.url);
                Some(stored.key)
            }
            None => None,
        };

        match self.feedback.create_status_update(update).await {
            Ok(created) => {
                info!(project_id, status_update_id = created.id, "Status update recorded");
                Ok(created)
            }
            Err(err) => {
                if let Some(key) = picture_key {
                    self.pictures.discard(&[key]).await;
                }
                Err(err.into())
            }
        }
    }

    /// Newest first
    pub async fn list_status_updates(&self, project_id: Id) -> CwResult<Vec<StatusUpdate>> {
        self.ensure_project(project_id).await?;
        Ok(self.feedback.list_status_updates(project_id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn create_comment(&self, project_id: Id, input: CommentInput) -> CwResult<Comment> {
        let comment = CommentContract::new(project_id).validate(input)?;
        self.ensure_project(project_id).await?;
        let created = self.feedback.create_comment(comment).await?;
        info!(project_id, comment_id = created.id, "Comment added");
        Ok(created)
    }

    /// Newest first
    pub async fn list_comments(&self, project_id: Id) -> CwResult<Vec<Comment>> {
        self.ensure_project(project_id).await?;
        Ok(self.feedback.list_comments(project_id).await?)
    }
}
