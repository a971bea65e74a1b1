//! Dashboard statistics over project aggregates

use std::collections::BTreeMap;

use chrono::NaiveDate;
use cw_models::{ProjectAggregate, ProjectStatus};
use serde::Serialize;

/// Key used for projects without a category
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentCounts {
    pub total: usize,
    pub public: usize,
    pub private: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectStatistics {
    pub total_projects: usize,
    /// Every status appears, with zero when unused
    pub by_status: BTreeMap<String, usize>,
    pub by_department: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// Sum over projects that have a budget; unset budgets are not zero
    pub total_budget: f64,
    pub budgeted_projects: usize,
    pub total_activities: usize,
    pub documents: DocumentCounts,
    /// Past their end date and not completed
    pub overdue_projects: usize,
}

pub fn compute(aggregates: &[ProjectAggregate], today: NaiveDate) -> ProjectStatistics {
    let mut stats = ProjectStatistics {
        total_projects: aggregates.len(),
        by_status: ProjectStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect(),
        ..Default::default()
    };

    for aggregate in aggregates {
        let project = &aggregate.project;

        *stats.by_status.entry(project.status.as_str().to_string()).or_default() += 1;
        *stats.by_department.entry(project.department.clone()).or_default() += 1;
        let category = project.category.as_deref().unwrap_or(UNCATEGORIZED);
        *stats.by_category.entry(category.to_string()).or_default() += 1;

        if let Some(budget) = project.budget {
            stats.total_budget += budget;
            stats.budgeted_projects += 1;
        }
        if project.is_overdue(today) {
            stats.overdue_projects += 1;
        }

        stats.total_activities += aggregate.activities.len();
        for document in &aggregate.documents {
            stats.documents.total += 1;
            if document.is_public {
                stats.documents.public += 1;
            } else {
                stats.documents.private += 1;
            }
        }
    }

    stats
}
