//! Core error types for CivicWorks
//!
//! Every crate converts its local errors into [`CwError`] at its boundary, and
//! the API layer maps a `CwError` to an HTTP status and error code.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Standard Result type for CivicWorks operations
pub type CwResult<T> = Result<T, CwError>;

/// Core error type for all CivicWorks operations
#[derive(Error, Debug)]
pub enum CwError {
    #[error("{entity} with {field}={value} not found")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CwError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        CwError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        CwError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CwError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a validation failure on a single field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        CwError::Validation(errors)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            CwError::NotFound { .. } => 404,
            CwError::Unauthorized { .. } => 401,
            CwError::Validation(_) => 400,
            CwError::Conflict { .. } => 409,
            CwError::PayloadTooLarge { .. } => 413,
            CwError::Database(_) | CwError::Storage(_) | CwError::Internal(_) => 500,
            CwError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CwError::NotFound { .. } => "not_found",
            CwError::Unauthorized { .. } => "unauthorized",
            CwError::Validation(_) => "validation_failed",
            CwError::Conflict { .. } => "conflict",
            CwError::Database(_) => "database_error",
            CwError::Storage(_) => "storage_error",
            CwError::PayloadTooLarge { .. } => "payload_too_large",
            CwError::Internal(_) => "internal_error",
            CwError::Config(_) => "configuration_error",
        }
    }
}

/// Validation errors collection, keyed by field name
#[derive(Error, Debug, Default, Clone, PartialEq, Serialize)]
#[error("{}", self.full_messages().join(", "))]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    /// Merge another set of errors, prefixing its field names (e.g. `activities[2].`)
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors
                .entry(format!("{}{}", prefix, field))
                .or_default()
                .extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, field_errors) in source.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", error.code));
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

impl From<validator::ValidationErrors> for CwError {
    fn from(source: validator::ValidationErrors) -> Self {
        CwError::Validation(source.into())
    }
}
