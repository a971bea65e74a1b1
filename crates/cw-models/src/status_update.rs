//! Status update model
//!
//! Table: status_updates. Append-only progress/problem reports.

use chrono::{DateTime, Utc};
use cw_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StatusUpdate {
    pub id: Id,
    pub project_id: Id,
    pub activity_id: Option<Id>,
    pub problem: Option<String>,
    pub solving: Option<String>,
    pub action: Option<String>,
    pub reporter_name: String,
    pub role: Option<String>,
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for StatusUpdate {
    fn id(&self) -> Id {
        self.id
    }
}

impl ProjectScoped for StatusUpdate {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Timestamped for StatusUpdate {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for StatusUpdate {
    const TABLE_NAME: &'static str = "status_updates";
    const TYPE_NAME: &'static str = "StatusUpdate";
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewStatusUpdate {
    pub project_id: Id,
    pub activity_id: Option<Id>,
    pub problem: Option<String>,
    pub solving: Option<String>,
    pub action: Option<String>,
    pub reporter_name: String,
    pub role: Option<String>,
    pub picture_url: Option<String>,
}
