//! Success envelope
//!
//! `{ "success": true, "message": "...", "data": ... }`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// 200 with data
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> ApiResponse<T> {
    ApiResponse::new(message, data)
}

/// 201 with the created resource
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> (StatusCode, ApiResponse<T>) {
    (StatusCode::CREATED, ApiResponse::new(message, data))
}
