//! Project repository
//!
//! Owns the aggregate write: the project row and its children are written in
//! one transaction, so a failing child leaves nothing behind.

use std::collections::HashMap;

use async_trait::async_trait;
use cw_core::traits::Id;
use cw_models::{Activity, Document, NewDocument, Project, ProjectAggregate, ProjectDraft};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info, instrument};

use crate::activities::ActivityRepository;
use crate::documents::DocumentRepository;
use crate::repository::{ProjectFilter, RepositoryError, RepositoryResult};
use crate::store::{AggregateWrite, ProjectStore};

const COLUMNS: &str = "id, name, code, department, location, start_date, end_date, objective, \
    category, budget, responsible_person, contact, status, created_at, updated_at";

pub struct ProjectRepository {
    pool: PgPool,
    activities: ActivityRepository,
    documents: DocumentRepository,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            activities: ActivityRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list(&self, filter: &ProjectFilter) -> RepositoryResult<Vec<Project>> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE ($1::project_status IS NULL OR status = $1) \
               AND ($2::text IS NULL OR lower(department) = lower($2)) \
               AND ($3::text IS NULL OR name ILIKE $3 OR code ILIKE $3 \
                    OR location ILIKE $3 OR objective ILIKE $3) \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, Project>(&query)
            .bind(filter.status)
            .bind(&filter.department)
            .bind(filter.search_pattern())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        draft: &ProjectDraft,
    ) -> RepositoryResult<Id> {
        let id: Id = sqlx::query_scalar(
            "INSERT INTO projects (name, code, department, location, start_date, end_date, \
                 objective, category, budget, responsible_person, contact, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING id",
        )
        .bind(&draft.name)
        .bind(&draft.code)
        .bind(&draft.department)
        .bind(&draft.location)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.objective)
        .bind(&draft.category)
        .bind(draft.budget)
        .bind(&draft.responsible_person)
        .bind(&draft.contact)
        .bind(draft.status)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    async fn update_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Id,
        draft: &ProjectDraft,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET name = $2, code = $3, department = $4, location = $5, \
                 start_date = $6, end_date = $7, objective = $8, category = $9, budget = $10, \
                 responsible_person = $11, contact = $12, status = $13, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.code)
        .bind(&draft.department)
        .bind(&draft.location)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.objective)
        .bind(&draft.category)
        .bind(draft.budget)
        .bind(&draft.responsible_person)
        .bind(&draft.contact)
        .bind(draft.status)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Project", id));
        }
        Ok(())
    }

    /// Nest children under their projects, keeping the project order
    async fn assemble(&self, projects: Vec<Project>) -> RepositoryResult<Vec<ProjectAggregate>> {
        let ids: Vec<Id> = projects.iter().map(|p| p.id).collect();
        let mut activities = group_by_project(self.activities.find_by_projects(&ids).await?, |a| {
            a.project_id
        });
        let mut documents = group_by_project(self.documents.find_by_projects(&ids).await?, |d| {
            d.project_id
        });

        Ok(projects
            .into_iter()
            .map(|project| ProjectAggregate {
                activities: activities.remove(&project.id).unwrap_or_default(),
                documents: documents.remove(&project.id).unwrap_or_default(),
                project,
            })
            .collect())
    }
}

fn group_by_project<T>(rows: Vec<T>, project_id: impl Fn(&T) -> Id) -> HashMap<Id, Vec<T>> {
    let mut grouped: HashMap<Id, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(project_id(&row)).or_default().push(row);
    }
    grouped
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    #[instrument(skip(self, write), fields(project_id = ?write.project_id))]
    async fn save_aggregate(&self, write: AggregateWrite) -> RepositoryResult<Id> {
        let mut tx = self.pool.begin().await?;

        let project_id = match write.project_id {
            Some(id) => {
                Self::update_in_tx(&mut tx, id, &write.project).await?;
                id
            }
            None => Self::insert_in_tx(&mut tx, &write.project).await?,
        };

        ActivityRepository::remove_in_tx(&mut tx, project_id, &write.removed_activity_ids).await?;
        for activity in &write.activities {
            ActivityRepository::upsert_in_tx(&mut tx, project_id, activity).await?;
        }
        for edit in &write.document_edits {
            DocumentRepository::edit_in_tx(&mut tx, project_id, edit).await?;
        }
        for document in &write.new_documents {
            DocumentRepository::insert_in_tx(&mut tx, project_id, document).await?;
        }

        tx.commit().await?;

        info!(
            project_id,
            activities = write.activities.len(),
            removed_activities = write.removed_activity_ids.len(),
            documents = write.new_documents.len(),
            "Project aggregate saved"
        );
        Ok(project_id)
    }

    async fn find_aggregate(&self, id: Id) -> RepositoryResult<Option<ProjectAggregate>> {
        let Some(project) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(self.assemble(vec![project]).await?.pop())
    }

    async fn list_aggregates(&self, filter: &ProjectFilter) -> RepositoryResult<Vec<ProjectAggregate>> {
        let projects = self.list(filter).await?;
        debug!(count = projects.len(), "Projects listed");
        self.assemble(projects).await
    }

    async fn project_exists(&self, id: Id) -> RepositoryResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_activity(&self, id: Id) -> RepositoryResult<Option<Activity>> {
        self.activities.find_by_id(id).await
    }

    async fn delete_activity(&self, id: Id) -> RepositoryResult<Activity> {
        self.activities.delete(id).await
    }

    async fn find_document(&self, id: Id) -> RepositoryResult<Option<Document>> {
        self.documents.find_by_id(id).await
    }

    async fn insert_document(&self, project_id: Id, document: NewDocument) -> RepositoryResult<Document> {
        if !self.project_exists(project_id).await? {
            return Err(RepositoryError::not_found("Project", project_id));
        }
        self.documents.create(project_id, &document).await
    }

    async fn set_document_visibility(&self, id: Id, is_public: bool) -> RepositoryResult<Document> {
        self.documents.set_visibility(id, is_public).await
    }

    async fn delete_document(&self, id: Id) -> RepositoryResult<Document> {
        self.documents.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_project_keeps_order() {
        let grouped = group_by_project(vec![(1, "a"), (2, "b"), (1, "c")], |row| row.0);
        assert_eq!(grouped[&1], vec![(1, "a"), (1, "c")]);
        assert_eq!(grouped[&2], vec![(2, "b")]);
    }
}
