//! Project model
//!
//! Table: projects

use chrono::{DateTime, NaiveDate, Utc};
use cw_core::traits::{Entity, Id, Identifiable, Timestamped};
use cw_core::types::DateRange;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::activity::Activity;
use crate::document::Document;

/// Lifecycle status of a project
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    InProgress,
    Suspended,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [Self::InProgress, Self::Suspended, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Suspended => "suspended",
            Self::Completed => "completed",
        }
    }

    /// Lenient parse: case-insensitive, `-` and spaces accepted in place of `_`
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "in_progress" => Some(Self::InProgress),
            "suspended" => Some(Self::Suspended),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Id,
    pub name: String,
    /// Short municipal reference code (e.g. `BG045`)
    pub code: String,
    pub department: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub objective: Option<String>,
    pub category: Option<String>,
    /// `None` means no budget was given, which is distinct from a zero budget
    pub budget: Option<f64>,
    pub responsible_person: Option<String>,
    pub contact: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Build a persisted project from a validated draft
    pub fn from_draft(id: Id, draft: ProjectDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            code: draft.code,
            department: draft.department,
            location: draft.location,
            start_date: draft.start_date,
            end_date: draft.end_date,
            objective: draft.objective,
            category: draft.category,
            budget: draft.budget,
            responsible_person: draft.responsible_person,
            contact: draft.contact,
            status: draft.status,
            created_at,
            updated_at: created_at,
        }
    }

    /// Overwrite every writable field from a draft (last write wins)
    pub fn apply_draft(&mut self, draft: ProjectDraft, updated_at: DateTime<Utc>) {
        let created_at = self.created_at;
        *self = Self::from_draft(self.id, draft, created_at);
        self.updated_at = updated_at;
    }

    pub fn dates(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Past its end date and not completed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != ProjectStatus::Completed && self.dates().ended_before(today)
    }
}

impl Identifiable for Project {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Project {
    const TABLE_NAME: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

/// Validated project fields, ready to be written
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub code: String,
    pub department: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub objective: Option<String>,
    pub category: Option<String>,
    pub budget: Option<f64>,
    pub responsible_person: Option<String>,
    pub contact: Option<String>,
    pub status: ProjectStatus,
}

/// A project with its activities and documents nested one level deep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAggregate {
    #[serde(flatten)]
    pub project: Project,
    pub activities: Vec<Activity>,
    pub documents: Vec<Document>,
}

impl ProjectAggregate {
    /// The citizen-facing view: private documents removed
    pub fn public_view(mut self) -> Self {
        self.documents.retain(|d| d.is_public);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Project {
        Project::from_draft(
            1,
            ProjectDraft {
                name: "Road repair".into(),
                code: "BG045".into(),
                department: "Town Hall".into(),
                end_date: NaiveDate::from_ymd_opt(2026, 2, 1),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ProjectStatus::parse("in-progress"), Some(ProjectStatus::InProgress));
        assert_eq!(ProjectStatus::parse("In Progress"), Some(ProjectStatus::InProgress));
        assert_eq!(ProjectStatus::parse("COMPLETED"), Some(ProjectStatus::Completed));
        assert_eq!(ProjectStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_overdue() {
        let mut project = sample();
        let later = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(project.is_overdue(later));

        project.status = ProjectStatus::Completed;
        assert!(!project.is_overdue(later));
    }

    #[test]
    fn test_apply_draft_keeps_identity() {
        let mut project = sample();
        let created = project.created_at;
        project.apply_draft(
            ProjectDraft {
                name: "Road resurfacing".into(),
                code: "BG045".into(),
                department: "Public Works".into(),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(project.id, 1);
        assert_eq!(project.created_at, created);
        assert_eq!(project.department, "Public Works");
        assert_eq!(project.end_date, None);
    }

    #[test]
    fn test_aggregate_flattens_project() {
        let aggregate = ProjectAggregate {
            project: sample(),
            activities: vec![],
            documents: vec![],
        };
        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(json["code"], "BG045");
        assert!(json["budget"].is_null());
        assert!(json["activities"].as_array().unwrap().is_empty());
    }
}
