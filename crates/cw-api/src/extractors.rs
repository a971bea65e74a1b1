//! Application state and request extractors

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query},
    http::request::Parts,
    Json,
};
use cw_auth::{Authenticator, CookieConfig, CurrentOfficer, SessionStore};
use cw_contracts::SubmissionLimits;
use cw_core::config::AppConfig;
use cw_core::error::CwError;
use cw_db::{FeedbackStore, OfficerStore, ProjectStore};
use cw_services::{AuthService, FeedbackService, ProjectService};
use cw_storage::Storage;

use crate::error::ApiError;

/// Backends the application runs on, created once at startup
#[derive(Clone)]
pub struct Backends {
    pub projects: Arc<dyn ProjectStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub officers: Arc<dyn OfficerStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub storage: Arc<dyn Storage>,
}

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub feedback: FeedbackService,
    pub auth: AuthService,
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(backends: Backends, config: &AppConfig) -> Self {
        let limits = SubmissionLimits {
            max_document_size: config.storage.max_document_size,
        };
        Self {
            projects: ProjectService::new(backends.projects.clone(), backends.storage.clone(), limits),
            feedback: FeedbackService::new(
                backends.projects,
                backends.feedback,
                backends.storage,
                config.storage.max_document_size,
            ),
            auth: AuthService::new(backends.officers, backends.sessions.clone(), config.auth.clone()),
            authenticator: Authenticator::new(
                backends.sessions,
                CookieConfig::from_auth_config(&config.auth),
            ),
        }
    }
}

/// JSON body whose rejections use the API error envelope
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections use the API error envelope
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters whose rejections use the API error envelope
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// The officer resolved by the session guard
pub struct AuthenticatedOfficer(pub CurrentOfficer);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedOfficer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentOfficer>()
            .cloned()
            .map(AuthenticatedOfficer)
            .ok_or_else(|| CwError::unauthorized("Authentication required").into())
    }
}

impl std::ops::Deref for AuthenticatedOfficer {
    type Target = CurrentOfficer;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
