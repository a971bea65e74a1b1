//! Officer login, logout, registration

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
};
use cw_auth::RequestHeaders;
use cw_contracts::{LoginInput, RegisterOfficerInput};
use serde_json::json;

use crate::error::ApiResult;
use crate::extractors::{ApiJson, AppState, AuthenticatedOfficer};
use crate::response::{created, ok};

/// POST /api/auth/login
///
/// Sets the session cookie and returns the token for bearer clients.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<LoginInput>,
) -> ApiResult<impl IntoResponse> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let outcome = state.auth.login(input, user_agent).await?;
    let cookie = state.authenticator.cookie_config().build_cookie(&outcome.token);

    Ok(([(header::SET_COOKIE, cookie)], ok("Logged in", outcome)))
}

/// POST /api/auth/logout
///
/// Always clears the cookie, whether or not the session still exists.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<impl IntoResponse> {
    let request_headers = RequestHeaders::from_header_map(&headers);
    if let Some(token) = state.authenticator.session_token(&request_headers) {
        state.auth.logout(&token).await?;
    }
    let cookie = state.authenticator.cookie_config().build_clear_cookie();

    Ok(([(header::SET_COOKIE, cookie)], ok("Logged out", json!(null))))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterOfficerInput>,
) -> ApiResult<impl IntoResponse> {
    let officer = state.auth.register(input).await?;
    Ok(created("Officer registered", officer))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    officer: AuthenticatedOfficer,
) -> ApiResult<impl IntoResponse> {
    let profile = state.auth.me(&officer).await?;
    Ok(ok("Current officer", profile))
}
