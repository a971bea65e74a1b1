//! Request handlers, grouped by resource

pub mod activities;
pub mod auth;
pub mod documents;
pub mod feedback;
pub mod projects;
pub mod statistics;

use axum::http::Uri;

use crate::error::ApiError;
use cw_core::error::CwError;

/// Fallback for unmatched paths
pub async fn not_found(uri: Uri) -> ApiError {
    CwError::NotFound {
        entity: "Route",
        field: "path",
        value: uri.path().to_string(),
    }
    .into()
}
