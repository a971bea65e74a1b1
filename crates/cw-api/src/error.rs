//! API error handling
//!
//! Every failure leaves as
//! `{ "success": false, "error": "<code>", "message": "...", "details": ... }`.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cw_core::error::{CwError, ValidationErrors};
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// A domain failure from the services
    Service(CwError),
    /// The request could not be read (malformed JSON, bad multipart, ...)
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Rejected { status, .. } => *status,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Service(err) => err.error_code(),
            ApiError::Rejected { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "payload_too_large"
            }
            ApiError::Rejected { .. } => "invalid_request",
        }
    }
}

impl From<CwError> for ApiError {
    fn from(err: CwError) -> Self {
        ApiError::Service(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Service(CwError::Validation(errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Rejected {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ValidationErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.error_code();

        let (message, details) = match self {
            ApiError::Service(CwError::Validation(errors)) => {
                ("Validation failed".to_string(), Some(errors))
            }
            ApiError::Service(err) => (err.to_string(), None),
            ApiError::Rejected { message, .. } => (message, None),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error, message = %message, "Request failed");
        }

        let body = ErrorBody {
            success: false,
            error,
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CwError::not_found("Project", 1), StatusCode::NOT_FOUND),
            (CwError::invalid("name", "can't be blank"), StatusCode::BAD_REQUEST),
            (CwError::unauthorized("Invalid credentials"), StatusCode::UNAUTHORIZED),
            (CwError::conflict("duplicate code"), StatusCode::CONFLICT),
            (CwError::Storage("bucket unavailable".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (CwError::PayloadTooLarge { size: 10, max: 5 }, StatusCode::PAYLOAD_TOO_LARGE),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_rejection_codes() {
        assert_eq!(ApiError::bad_request("bad json").error_code(), "invalid_request");
        let too_large = ApiError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".into(),
        };
        assert_eq!(too_large.error_code(), "payload_too_large");
    }
}
