//! Document repository

use cw_core::traits::Id;
use cw_models::{Document, DocumentEdit, NewDocument};
use sqlx::{PgPool, Postgres, Transaction};

use crate::repository::{RepositoryError, RepositoryResult};

const COLUMNS: &str =
    "id, project_id, name, url, is_public, storage_key, content_type, created_at";

pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Document>> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        let row = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_projects(&self, project_ids: &[Id]) -> RepositoryResult<Vec<Document>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM documents WHERE project_id = ANY($1) ORDER BY project_id, id"
        );
        let rows = sqlx::query_as::<_, Document>(&query)
            .bind(project_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, project_id: Id, document: &NewDocument) -> RepositoryResult<Document> {
        let mut tx = self.pool.begin().await?;
        let created = Self::insert_in_tx(&mut tx, project_id, document).await?;
        tx.commit().await?;
        Ok(created)
    }

    pub async fn set_visibility(&self, id: Id, is_public: bool) -> RepositoryResult<Document> {
        let query = format!("UPDATE documents SET is_public = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(is_public)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Document", id))
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<Document> {
        let query = format!("DELETE FROM documents WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Document", id))
    }

    pub(crate) async fn insert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Id,
        document: &NewDocument,
    ) -> RepositoryResult<Document> {
        let query = format!(
            "INSERT INTO documents (project_id, name, url, is_public, storage_key, content_type) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Document>(&query)
            .bind(project_id)
            .bind(&document.name)
            .bind(&document.url)
            .bind(document.is_public)
            .bind(&document.storage_key)
            .bind(&document.content_type)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row)
    }

    /// Apply a name/visibility edit to a document of the given project
    pub(crate) async fn edit_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Id,
        edit: &DocumentEdit,
    ) -> RepositoryResult<()> {
        let updated: Option<Id> = sqlx::query_scalar(
            "UPDATE documents SET name = COALESCE($3, name), is_public = COALESCE($4, is_public) \
             WHERE id = $1 AND project_id = $2 RETURNING id",
        )
        .bind(edit.id)
        .bind(project_id)
        .bind(&edit.name)
        .bind(edit.is_public)
        .fetch_optional(&mut **tx)
        .await?;

        updated.map(|_| ()).ok_or_else(|| {
            RepositoryError::invalid(
                "documents",
                format!("document {} does not belong to project {}", edit.id, project_id),
            )
        })
    }
}
