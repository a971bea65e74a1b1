use axum::{extract::State, response::IntoResponse};
use cw_core::traits::Id;

use crate::error::ApiResult;
use crate::extractors::{ApiPath, AppState};
use crate::response::ok;

/// DELETE /api/admin/activities/:id
///
/// Status updates that referenced the activity stay, detached from it.
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<Id>) -> ApiResult<impl IntoResponse> {
    let activity = state.projects.delete_activity(id).await?;
    Ok(ok("Activity deleted", activity))
}
