//! Server-side officer sessions
//!
//! The session id handed to the client is an opaque random token. Every admin
//! request looks it up in a [`SessionStore`]; nothing about the officer is
//! trusted from the client.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use cw_core::config::AuthConfig;
use cw_core::traits::Id;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,
    #[error("Session expired")]
    Expired,
    #[error("Session store error: {0}")]
    Backend(String),
}

/// An authenticated officer session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub officer_id: Id,
    pub email: String,
    pub agency: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
}

impl Session {
    pub fn new(
        officer_id: Id,
        email: impl Into<String>,
        agency: Option<String>,
        lifetime_seconds: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_session_id(),
            officer_id,
            email: email.into(),
            agency,
            created_at: now,
            expires_at: now + Duration::seconds(lifetime_seconds),
            user_agent: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Generate a secure random session ID
fn generate_session_id() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const SESSION_ID_LENGTH: usize = 64;

    let mut rng = rand::rng();
    (0..SESSION_ID_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Session store trait for different backends
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get a session by ID, expired or not
    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError>;

    /// Store a session
    async fn set(&self, session: Session) -> Result<(), SessionError>;

    /// Delete a session; unknown ids are ignored
    async fn delete(&self, session_id: &str) -> Result<(), SessionError>;

    /// Delete all sessions of an officer
    async fn delete_officer_sessions(&self, officer_id: Id) -> Result<usize, SessionError>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> Result<usize, SessionError>;
}

/// In-memory session store (single process deployments and tests)
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn poisoned<T>(_: T) -> SessionError {
        SessionError::Backend("session lock poisoned".to_string())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.read().map_err(Self::poisoned)?;
        Ok(sessions.get(session_id).cloned())
    }

    async fn set(&self, session: Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
        sessions.remove(session_id);
        Ok(())
    }

    async fn delete_officer_sessions(&self, officer_id: Id) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, s| s.officer_id != officer_id);
        Ok(before - sessions.len())
    }

    async fn cleanup_expired(&self) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_valid());
        Ok(before - sessions.len())
    }
}

/// Cookie configuration for sessions
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub max_age: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "cw_session".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            max_age: None,
        }
    }
}

impl CookieConfig {
    /// Cookie matching the configured session lifetime
    pub fn from_auth_config(config: &AuthConfig) -> Self {
        Self {
            name: config.session_cookie_name.clone(),
            secure: config.session_cookie_secure,
            max_age: Some(config.session_lifetime_seconds),
            ..Default::default()
        }
    }

    /// Build cookie header value
    pub fn build_cookie(&self, session_id: &str) -> String {
        let mut parts = vec![format!("{}={}", self.name, session_id)];

        parts.push(format!("Path={}", self.path));

        if let Some(ref domain) = self.domain {
            parts.push(format!("Domain={}", domain));
        }

        if self.secure {
            parts.push("Secure".to_string());
        }

        if self.http_only {
            parts.push("HttpOnly".to_string());
        }

        match self.same_site {
            SameSite::Strict => parts.push("SameSite=Strict".to_string()),
            SameSite::Lax => parts.push("SameSite=Lax".to_string()),
            SameSite::None => parts.push("SameSite=None".to_string()),
        }

        if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={}", max_age));
        }

        parts.join("; ")
    }

    /// Build cookie header to clear the session
    pub fn build_clear_cookie(&self) -> String {
        format!("{}=; Path={}; Max-Age=0; HttpOnly", self.name, self.path)
    }
}

/// Extract session ID from cookie header
pub fn extract_session_id(cookie_header: &str, cookie_name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = Session::new(1, "clerk@town.gov", None, 3600);
        assert!(session.is_valid());
        assert_eq!(session.id.len(), 64);
        assert_ne!(session.id, Session::new(1, "clerk@town.gov", None, 3600).id);
    }

    #[test]
    fn test_expired_session() {
        let session = Session::new(1, "clerk@town.gov", None, -1);
        assert!(!session.is_valid());
    }

    #[tokio::test]
    async fn test_memory_session_store() {
        let store = MemorySessionStore::new();
        let session = Session::new(7, "clerk@town.gov", Some("Roads".into()), 3600);
        let session_id = session.id.clone();

        store.set(session).await.unwrap();
        let retrieved = store.get(&session_id).await.unwrap().unwrap();
        assert_eq!(retrieved.officer_id, 7);
        assert_eq!(retrieved.agency.as_deref(), Some("Roads"));

        store.delete(&session_id).await.unwrap();
        assert!(store.get(&session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_and_officer_sessions() {
        let store = MemorySessionStore::new();
        store.set(Session::new(1, "a@town.gov", None, 3600)).await.unwrap();
        store.set(Session::new(1, "a@town.gov", None, 3600)).await.unwrap();
        store.set(Session::new(2, "b@town.gov", None, -10)).await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
        assert_eq!(store.delete_officer_sessions(1).await.unwrap(), 2);
    }

    #[test]
    fn test_cookie_config() {
        let config = CookieConfig::from_auth_config(&AuthConfig {
            session_lifetime_seconds: 600,
            session_cookie_name: "cw_session".into(),
            session_cookie_secure: false,
            self_registration: true,
            password_min_length: 8,
        });
        let cookie = config.build_cookie("abc123");

        assert!(cookie.starts_with("cw_session=abc123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=600"));
        assert!(!cookie.contains("Secure"));
        assert!(config.build_clear_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_session_id() {
        let cookie = "theme=dark; cw_session=abc123; other=value";
        assert_eq!(extract_session_id(cookie, "cw_session"), Some("abc123".to_string()));
        assert_eq!(extract_session_id(cookie, "missing"), None);
        assert_eq!(extract_session_id("cw_session=", "cw_session"), None);
    }
}
