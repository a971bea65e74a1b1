//! Project aggregate handlers, officer and public

use axum::{
    extract::State,
    response::IntoResponse,
};
use cw_contracts::ProjectSubmission;
use cw_core::error::CwError;
use cw_core::traits::Id;
use cw_db::ProjectFilter;
use cw_models::ProjectStatus;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AppState};
use crate::response::{created, ok};

/// Listing filters; blank values are ignored
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectListQuery {
    pub status: Option<String>,
    pub department: Option<String>,
    #[serde(alias = "q")]
    pub search: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<ProjectListQuery> for ProjectFilter {
    type Error = ApiError;

    fn try_from(query: ProjectListQuery) -> Result<Self, Self::Error> {
        let status = match non_blank(query.status) {
            Some(raw) => Some(
                ProjectStatus::parse(&raw)
                    .ok_or_else(|| CwError::invalid("status", "is not a valid status"))?,
            ),
            None => None,
        };
        Ok(ProjectFilter {
            status,
            department: non_blank(query.department),
            search: non_blank(query.search),
        })
    }
}

/// GET /api/admin/projects
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProjectListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = ProjectFilter::try_from(query)?;
    let projects = state.projects.list(&filter).await?;
    Ok(ok("Projects", projects))
}

/// POST /api/admin/projects
pub async fn create(
    State(state): State<AppState>,
    ApiJson(submission): ApiJson<ProjectSubmission>,
) -> ApiResult<impl IntoResponse> {
    let project = state.projects.create(submission).await?;
    Ok(created("Project created", project))
}

/// GET /api/admin/projects/:id
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<Id>) -> ApiResult<impl IntoResponse> {
    let project = state.projects.get(id).await?;
    Ok(ok("Project", project))
}

/// PUT /api/admin/projects/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
    ApiJson(submission): ApiJson<ProjectSubmission>,
) -> ApiResult<impl IntoResponse> {
    let project = state.projects.update(id, submission).await?;
    Ok(ok("Project updated", project))
}

/// GET /api/public/projects
pub async fn list_public(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProjectListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = ProjectFilter::try_from(query)?;
    let projects = state.projects.list_public(&filter).await?;
    Ok(ok("Projects", projects))
}

/// GET /api/public/projects/:id
pub async fn get_public(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<impl IntoResponse> {
    let project = state.projects.get_public(id).await?;
    Ok(ok("Project", project))
}
