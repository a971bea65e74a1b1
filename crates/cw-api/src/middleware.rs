//! Session guard for officer routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use cw_auth::{AuthResult, RequestHeaders};
use cw_core::error::CwError;
use tracing::debug;

use crate::error::ApiError;
use crate::extractors::AppState;

/// Resolve the session of the request or answer 401.
///
/// On success the [`cw_auth::CurrentOfficer`] is stored in the request
/// extensions for [`crate::extractors::AuthenticatedOfficer`].
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = RequestHeaders::from_header_map(request.headers());

    match state.authenticator.authenticate(&headers).await {
        AuthResult::Authenticated(officer) => {
            request.extensions_mut().insert(officer);
            Ok(next.run(request).await)
        }
        AuthResult::Failed(err) => {
            debug!(path = %request.uri().path(), reason = %err, "Rejected unauthenticated request");
            Err(CwError::from(err).into())
        }
    }
}
