//! Document upload, visibility and removal

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::IntoResponse,
};
use cw_contracts::normalize::{self, BLANK};
use cw_contracts::upload::{check_content_type, resolve_content_type};
use cw_contracts::DecodedFile;
use cw_core::error::ValidationErrors;
use cw_core::traits::Id;
use cw_services::DocumentUpload;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AppState};
use crate::response::{created, ok};

const DEFAULT_FILE_NAME: &str = "document";

/// POST /api/admin/projects/:id/documents
///
/// Multipart fields: `file` (required), `name`, `is_public`. The declared
/// type of `file` must be a `type/subtype` media type.
pub async fn upload(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Id>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut multipart = multipart?;
    let mut file = None;
    let mut name = None;
    let mut is_public = Value::Null;
    let mut errors = ValidationErrors::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
                let declared = field.content_type().map(str::to_string);
                if let Some(declared) = declared.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                    if let Err(message) = check_content_type(declared) {
                        errors.add("content_type", message);
                    }
                }
                let bytes = field.bytes().await?;
                let content_type = resolve_content_type(declared.as_deref(), None, &file_name);
                file = Some(DecodedFile::new(file_name, bytes.to_vec(), content_type));
            }
            "name" => name = Some(field.text().await?),
            "is_public" | "public" | "isPublic" => is_public = Value::String(field.text().await?),
            _ => {}
        }
    }

    let is_public = normalize::flag(&is_public, "is_public", &mut errors).unwrap_or(false);
    let Some(file) = file else {
        errors.add("file", BLANK);
        return Err(errors.into());
    };
    errors.into_result()?;

    let document = state
        .projects
        .attach_document(project_id, DocumentUpload { file, name, is_public })
        .await?;
    Ok(created("Document uploaded", document))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VisibilityInput {
    #[serde(alias = "public", alias = "isPublic")]
    pub is_public: Value,
}

/// PATCH /api/admin/documents/:id
pub async fn set_visibility(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
    ApiJson(input): ApiJson<VisibilityInput>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = ValidationErrors::new();
    let Some(is_public) = normalize::flag(&input.is_public, "is_public", &mut errors) else {
        if !errors.has_error("is_public") {
            errors.add("is_public", BLANK);
        }
        return Err(errors.into());
    };

    let document = state.projects.set_document_visibility(id, is_public).await?;
    Ok(ok("Document updated", document))
}

/// DELETE /api/admin/documents/:id
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<Id>) -> ApiResult<impl IntoResponse> {
    let document = state.projects.delete_document(id).await?;
    Ok(ok("Document deleted", document))
}
