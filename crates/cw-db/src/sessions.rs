//! PostgreSQL-backed officer sessions

use async_trait::async_trait;
use chrono::Utc;
use cw_auth::{Session, SessionError, SessionStore};
use cw_core::traits::Id;
use sqlx::{FromRow, PgPool};

const COLUMNS: &str = "id, officer_id, email, agency, user_agent, created_at, expires_at";

#[derive(Debug, FromRow)]
struct SessionRow {
    id: String,
    officer_id: Id,
    email: String,
    agency: Option<String>,
    user_agent: Option<String>,
    created_at: chrono::DateTime<Utc>,
    expires_at: chrono::DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            officer_id: row.officer_id,
            email: row.email,
            agency: row.agency,
            created_at: row.created_at,
            expires_at: row.expires_at,
            user_agent: row.user_agent,
        }
    }
}

fn backend(err: sqlx::Error) -> SessionError {
    SessionError::Backend(err.to_string())
}

/// Sessions survive restarts and are shared between server instances
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.map(Session::from))
    }

    async fn set(&self, session: Session) -> Result<(), SessionError> {
        sqlx::query(
            "INSERT INTO sessions (id, officer_id, email, agency, user_agent, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET expires_at = EXCLUDED.expires_at",
        )
        .bind(&session.id)
        .bind(session.officer_id)
        .bind(&session.email)
        .bind(&session.agency)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete_officer_sessions(&self, officer_id: Id) -> Result<usize, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE officer_id = $1")
            .bind(officer_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() as usize)
    }

    async fn cleanup_expired(&self) -> Result<usize, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() as usize)
    }
}
