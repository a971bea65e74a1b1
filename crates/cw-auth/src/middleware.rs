//! Request authentication
//!
//! Resolves the session token of a request (cookie or `Authorization: Bearer`)
//! to the officer it belongs to.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use cw_core::error::CwError;
use cw_core::traits::Id;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::session::{extract_session_id, CookieConfig, Session, SessionError, SessionStore};

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Required,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Session expired")]
    SessionExpired,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound => AuthError::InvalidCredentials,
            SessionError::Expired => AuthError::SessionExpired,
            SessionError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<AuthError> for CwError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(msg) => CwError::Internal(msg),
            other => CwError::unauthorized(other.to_string()),
        }
    }
}

/// The officer behind an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentOfficer {
    pub id: Id,
    pub email: String,
    pub agency: Option<String>,
    #[serde(skip)]
    pub session_id: String,
}

impl From<Session> for CurrentOfficer {
    fn from(session: Session) -> Self {
        Self {
            id: session.officer_id,
            email: session.email,
            agency: session.agency,
            session_id: session.id,
        }
    }
}

/// Authentication result
#[derive(Debug)]
pub enum AuthResult {
    Authenticated(CurrentOfficer),
    Failed(AuthError),
}

/// Request headers relevant for authentication
#[derive(Debug, Default)]
pub struct RequestHeaders {
    pub authorization: Option<String>,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestHeaders {
    /// Create from a list of header key-value pairs
    pub fn from_pairs(pairs: &[(impl AsRef<str>, impl AsRef<str>)]) -> Self {
        let mut headers = Self::default();

        for (name, value) in pairs {
            let value = value.as_ref().to_string();
            match name.as_ref().to_lowercase().as_str() {
                "authorization" => headers.authorization = Some(value),
                "cookie" => headers.cookie = Some(value),
                "user-agent" => headers.user_agent = Some(value),
                _ => {}
            }
        }

        headers
    }

    pub fn from_header_map(map: &HeaderMap) -> Self {
        let get = |name: header::HeaderName| {
            map.get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            authorization: get(header::AUTHORIZATION),
            cookie: get(header::COOKIE),
            user_agent: get(header::USER_AGENT),
        }
    }
}

/// Extract the token of an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authenticator for validating requests
#[derive(Clone)]
pub struct Authenticator {
    sessions: Arc<dyn SessionStore>,
    cookie: CookieConfig,
}

impl Authenticator {
    pub fn new(sessions: Arc<dyn SessionStore>, cookie: CookieConfig) -> Self {
        Self { sessions, cookie }
    }

    pub fn cookie_config(&self) -> &CookieConfig {
        &self.cookie
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Session token of a request: bearer header first, then the cookie
    pub fn session_token(&self, headers: &RequestHeaders) -> Option<String> {
        headers
            .authorization
            .as_deref()
            .and_then(extract_bearer_token)
            .map(str::to_string)
            .or_else(|| {
                headers
                    .cookie
                    .as_deref()
                    .and_then(|c| extract_session_id(c, &self.cookie.name))
            })
    }

    /// Authenticate a request against the session store
    pub async fn authenticate(&self, headers: &RequestHeaders) -> AuthResult {
        let Some(token) = self.session_token(headers) else {
            return AuthResult::Failed(AuthError::Required);
        };

        match self.resolve(&token).await {
            Ok(officer) => AuthResult::Authenticated(officer),
            Err(err) => AuthResult::Failed(err),
        }
    }

    async fn resolve(&self, token: &str) -> Result<CurrentOfficer, AuthError> {
        let session = self
            .sessions
            .get(token)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !session.is_valid() {
            debug!(officer_id = session.officer_id, "Rejected expired session");
            self.sessions.delete(token).await?;
            return Err(AuthError::SessionExpired);
        }

        Ok(session.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    async fn setup(lifetime: i64) -> (Authenticator, String) {
        let store = Arc::new(MemorySessionStore::new());
        let session = Session::new(3, "clerk@town.gov", Some("Roads".into()), lifetime);
        let token = session.id.clone();
        store.set(session).await.unwrap();
        (Authenticator::new(store, CookieConfig::default()), token)
    }

    #[tokio::test]
    async fn test_bearer_authentication() {
        let (auth, token) = setup(3600).await;
        let headers = RequestHeaders {
            authorization: Some(format!("Bearer {}", token)),
            ..Default::default()
        };

        match auth.authenticate(&headers).await {
            AuthResult::Authenticated(officer) => {
                assert_eq!(officer.id, 3);
                assert_eq!(officer.email, "clerk@town.gov");
                assert_eq!(officer.session_id, token);
            }
            other => panic!("Expected authenticated result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cookie_authentication() {
        let (auth, token) = setup(3600).await;
        let headers = RequestHeaders::from_pairs(&[("Cookie", format!("cw_session={}", token))]);
        assert!(matches!(auth.authenticate(&headers).await, AuthResult::Authenticated(_)));
    }

    #[tokio::test]
    async fn test_missing_and_unknown_tokens() {
        let (auth, _) = setup(3600).await;

        let result = auth.authenticate(&RequestHeaders::default()).await;
        assert!(matches!(result, AuthResult::Failed(AuthError::Required)));

        let headers = RequestHeaders::from_pairs(&[("Authorization", "Bearer forged")]);
        let result = auth.authenticate(&headers).await;
        assert!(matches!(result, AuthResult::Failed(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let (auth, token) = setup(-5).await;
        let headers = RequestHeaders::from_pairs(&[("Authorization", format!("Bearer {}", token))]);

        let result = auth.authenticate(&headers).await;
        assert!(matches!(result, AuthResult::Failed(AuthError::SessionExpired)));
        assert!(auth.sessions().get(&token).await.unwrap().is_none());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_auth_error_maps_to_unauthorized() {
        let err: CwError = AuthError::SessionExpired.into();
        assert_eq!(err.status_code(), 401);
    }
}
