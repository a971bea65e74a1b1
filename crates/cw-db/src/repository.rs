//! Repository errors and shared query types

use cw_core::error::CwError;
use cw_core::traits::Id;
use cw_models::{Project, ProjectStatus};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} with id={id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A submitted reference that the database cannot honour
    #[error("{field}: {message}")]
    Invalid { field: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        RepositoryError::NotFound { entity, id }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        RepositoryError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Message for a unique constraint violation, by constraint name
fn conflict_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("projects_code_key") => "A project with this code already exists".to_string(),
        Some("officers_email_key") => "An officer with this email already exists".to_string(),
        Some(other) => format!("Duplicate value violates {}", other),
        None => "Duplicate value".to_string(),
    }
}

impl From<RepositoryError> for CwError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => CwError::not_found(entity, id),
            RepositoryError::Invalid { field, message } => CwError::invalid(field, message),
            RepositoryError::Conflict(message) => CwError::conflict(message),
            RepositoryError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                CwError::conflict(conflict_message(db.constraint()))
            }
            RepositoryError::Database(e) => CwError::Database(e.to_string()),
        }
    }
}

/// Listing filter for projects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    /// Exact department, case-insensitive
    pub department: Option<String>,
    /// Substring of name, code, location or objective, case-insensitive
    pub search: Option<String>,
}

impl ProjectFilter {
    /// In-process equivalent of the SQL filter
    pub fn matches(&self, project: &Project) -> bool {
        if self.status.is_some_and(|s| s != project.status) {
            return false;
        }
        if let Some(department) = &self.department {
            if !project.department.eq_ignore_ascii_case(department) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = |value: Option<&str>| {
                value.is_some_and(|v| v.to_lowercase().contains(&needle))
            };
            if !(hit(Some(&project.name))
                || hit(Some(&project.code))
                || hit(project.location.as_deref())
                || hit(project.objective.as_deref()))
            {
                return false;
            }
        }
        true
    }

    /// `%search%` with LIKE wildcards escaped
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}
