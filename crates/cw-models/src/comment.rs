//! Comment model
//!
//! Table: comments. Left by citizens on published projects.

use chrono::{DateTime, Utc};
use cw_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Id,
    pub project_id: Id,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Comment {
    fn id(&self) -> Id {
        self.id
    }
}

impl ProjectScoped for Comment {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Timestamped for Comment {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Comment {
    const TABLE_NAME: &'static str = "comments";
    const TYPE_NAME: &'static str = "Comment";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub project_id: Id,
    pub author_name: String,
    pub content: String,
}
