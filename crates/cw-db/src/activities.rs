//! Activity repository
//!
//! Reads go through the pool; writes that belong to a project aggregate take
//! the surrounding transaction.

use cw_core::traits::Id;
use cw_models::{Activity, ActivityDraft};
use sqlx::{PgPool, Postgres, Transaction};

use crate::repository::{RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, project_id, description, start_date, end_date";

pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Activity>> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1");
        let row = sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Activities of several projects, in insertion order per project
    pub async fn find_by_projects(&self, project_ids: &[Id]) -> RepositoryResult<Vec<Activity>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM activities WHERE project_id = ANY($1) ORDER BY project_id, id"
        );
        let rows = sqlx::query_as::<_, Activity>(&query)
            .bind(project_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<Activity> {
        let query = format!("DELETE FROM activities WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Activity", id))
    }

    /// Delete the listed activities of a project; every id must belong to it
    pub(crate) async fn remove_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Id,
        ids: &[Id],
    ) -> RepositoryResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let deleted: Vec<Id> = sqlx::query_scalar(
            "DELETE FROM activities WHERE project_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(project_id)
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;

        if let Some(missing) = ids.iter().find(|id| !deleted.contains(id)) {
            return Err(RepositoryError::invalid(
                "removed_activity_ids",
                format!("activity {} does not belong to project {}", missing, project_id),
            ));
        }
        Ok(())
    }

    /// Update in place when the draft has an id, insert otherwise
    pub(crate) async fn upsert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Id,
        draft: &ActivityDraft,
    ) -> RepositoryResult<Id> {
        match draft.id {
            Some(id) => {
                let updated: Option<Id> = sqlx::query_scalar(
                    "UPDATE activities SET description = $3, start_date = $4, end_date = $5 \
                     WHERE id = $1 AND project_id = $2 RETURNING id",
                )
                .bind(id)
                .bind(project_id)
                .bind(&draft.description)
                .bind(draft.start_date)
                .bind(draft.end_date)
                .fetch_optional(&mut **tx)
                .await?;

                updated.ok_or_else(|| {
                    RepositoryError::invalid(
                        "activities",
                        format!("activity {} does not belong to project {}", id, project_id),
                    )
                })
            }
            None => {
                let id: Id = sqlx::query_scalar(
                    "INSERT INTO activities (project_id, description, start_date, end_date) \
                     VALUES ($1, $2, $3, $4) RETURNING id",
                )
                .bind(project_id)
                .bind(&draft.description)
                .bind(draft.start_date)
                .bind(draft.end_date)
                .fetch_one(&mut **tx)
                .await?;
                Ok(id)
            }
        }
    }
}
