//! Status update and comment repository

use async_trait::async_trait;
use cw_core::traits::Id;
use cw_models::{Comment, NewComment, NewStatusUpdate, StatusUpdate};
use sqlx::PgPool;

use crate::repository::RepositoryResult;
use crate::store::FeedbackStore;

const STATUS_UPDATE_COLUMNS: &str = "id, project_id, activity_id, problem, solving, action, \
    reporter_name, role, picture_url, created_at";

const COMMENT_COLUMNS: &str = "id, project_id, author_name, content, created_at";

pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for FeedbackRepository {
    async fn create_status_update(&self, update: NewStatusUpdate) -> RepositoryResult<StatusUpdate> {
        let query = format!(
            "INSERT INTO status_updates \
                (project_id, activity_id, problem, solving, action, reporter_name, role, picture_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {STATUS_UPDATE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, StatusUpdate>(&query)
            .bind(update.project_id)
            .bind(update.activity_id)
            .bind(&update.problem)
            .bind(&update.solving)
            .bind(&update.action)
            .bind(&update.reporter_name)
            .bind(&update.role)
            .bind(&update.picture_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_status_updates(&self, project_id: Id) -> RepositoryResult<Vec<StatusUpdate>> {
        let query = format!(
            "SELECT {STATUS_UPDATE_COLUMNS} FROM status_updates \
             WHERE project_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, StatusUpdate>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment> {
        let query = format!(
            "INSERT INTO comments (project_id, author_name, content) \
             VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Comment>(&query)
            .bind(comment.project_id)
            .bind(&comment.author_name)
            .bind(&comment.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_comments(&self, project_id: Id) -> RepositoryResult<Vec<Comment>> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE project_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, Comment>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
