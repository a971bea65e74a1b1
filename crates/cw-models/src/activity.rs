//! Activity model
//!
//! Table: activities. A phase of a project with its own date range.

use chrono::NaiveDate;
use cw_core::traits::{Entity, Id, Identifiable, ProjectScoped};
use cw_core::types::DateRange;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: Id,
    pub project_id: Id,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Activity {
    pub fn dates(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

impl Identifiable for Activity {
    fn id(&self) -> Id {
        self.id
    }
}

impl ProjectScoped for Activity {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Entity for Activity {
    const TABLE_NAME: &'static str = "activities";
    const TYPE_NAME: &'static str = "Activity";
}

/// Validated activity row. `id` set means update in place, unset means insert.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityDraft {
    pub id: Option<Id>,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
