use axum::{extract::State, response::IntoResponse};

use crate::error::ApiResult;
use crate::extractors::AppState;
use crate::response::ok;

/// GET /api/admin/statistics
pub async fn show(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let statistics = state.projects.statistics().await?;
    Ok(ok("Statistics", statistics))
}
