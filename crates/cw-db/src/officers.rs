//! Officer repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cw_core::traits::Id;
use cw_models::{NewOfficer, Officer};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::OfficerStore;

const COLUMNS: &str = "id, email, password_hash, agency, last_login_at, created_at";

pub struct OfficerRepository {
    pool: PgPool,
}

impl OfficerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfficerStore for OfficerRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Officer>> {
        let query = format!("SELECT {COLUMNS} FROM officers WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, Officer>(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Officer>> {
        let query = format!("SELECT {COLUMNS} FROM officers WHERE id = $1");
        let row = sqlx::query_as::<_, Officer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, officer: NewOfficer) -> RepositoryResult<Officer> {
        let query = format!(
            "INSERT INTO officers (email, password_hash, agency) VALUES (lower($1), $2, $3) \
             RETURNING {COLUMNS}"
        );
        let result = sqlx::query_as::<_, Officer>(&query)
            .bind(officer.email.trim())
            .bind(&officer.password_hash)
            .bind(&officer.agency)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                RepositoryError::Conflict("An officer with this email already exists".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn record_login(&self, id: Id, at: DateTime<Utc>) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE officers SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Officer", id));
        }
        Ok(())
    }
}
