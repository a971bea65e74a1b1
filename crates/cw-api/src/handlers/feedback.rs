//! Status updates and citizen comments

use axum::{extract::State, response::IntoResponse};
use cw_contracts::{CommentInput, StatusUpdateInput};
use cw_core::traits::Id;

use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AppState};
use crate::response::{created, ok};

/// POST /api/admin/projects/:id/status-updates
pub async fn create_status_update(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Id>,
    ApiJson(input): ApiJson<StatusUpdateInput>,
) -> ApiResult<impl IntoResponse> {
    let update = state.feedback.create_status_update(project_id, input).await?;
    Ok(created("Status update recorded", update))
}

/// GET /api/public/projects/:id/status-updates
pub async fn list_status_updates(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    let updates = state.feedback.list_status_updates(project_id).await?;
    Ok(ok("Status updates", updates))
}

/// GET /api/public/projects/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    let comments = state.feedback.list_comments(project_id).await?;
    Ok(ok("Comments", comments))
}

/// POST /api/public/projects/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Id>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<impl IntoResponse> {
    let comment = state.feedback.create_comment(project_id, input).await?;
    Ok(created("Comment posted", comment))
}
