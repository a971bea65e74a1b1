//! Document model
//!
//! Table: documents. A file attached to a project, optionally public.

use chrono::{DateTime, Utc};
use cw_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Id,
    pub project_id: Id,
    /// Display name
    pub name: String,
    /// Publicly resolvable URL of the stored file
    pub url: String,
    pub is_public: bool,
    /// Object key in our storage; `None` for external references
    #[serde(skip)]
    pub storage_key: Option<String>,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Document {
    fn id(&self) -> Id {
        self.id
    }
}

impl ProjectScoped for Document {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Timestamped for Document {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Document {
    const TABLE_NAME: &'static str = "documents";
    const TYPE_NAME: &'static str = "Document";
}

/// A document row to insert, after its bytes (if any) were stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub name: String,
    pub url: String,
    pub is_public: bool,
    pub storage_key: Option<String>,
    pub content_type: Option<String>,
}

/// Edit of an existing document; `None` keeps the stored value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEdit {
    pub id: Id,
    pub name: Option<String>,
    pub is_public: Option<bool>,
}
