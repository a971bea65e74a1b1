//! Create contract for projects

use cw_core::error::ValidationErrors;

use super::base::{ProjectBaseContract, SubmissionLimits};
use super::submission::ProjectSubmission;
use super::{DocumentInput, ValidatedSubmission};
use crate::base::{Contract, ValidationResult};

/// A new project: children must all be new as well
#[derive(Debug, Clone, Default)]
pub struct CreateProjectContract {
    base: ProjectBaseContract,
}

impl CreateProjectContract {
    pub fn new(limits: SubmissionLimits) -> Self {
        Self {
            base: ProjectBaseContract::new(limits),
        }
    }

    fn validate_children_are_new(submission: &ProjectSubmission, errors: &mut ValidationErrors) {
        for (index, activity) in submission.activities.iter().enumerate() {
            if activity.id.is_some() && !activity.is_blank() {
                errors.add(
                    format!("activities[{}].id", index),
                    "must be empty when creating a project",
                );
            }
        }
        if !submission.removed_activity_ids.is_empty() {
            errors.add("removed_activity_ids", "must be empty when creating a project");
        }
    }
}

impl Contract<ProjectSubmission> for CreateProjectContract {
    type Output = ValidatedSubmission;

    fn validate(&self, submission: ProjectSubmission) -> ValidationResult<ValidatedSubmission> {
        let mut errors = ValidationErrors::new();
        Self::validate_children_are_new(&submission, &mut errors);

        let validated = match self.base.validate(submission) {
            Ok(validated) => Some(validated),
            Err(base_errors) => {
                errors.merge(base_errors);
                None
            }
        };

        if let Some(validated) = &validated {
            if validated
                .documents
                .iter()
                .any(|d| matches!(d, DocumentInput::Edit(_)))
            {
                errors.add("documents", "cannot reference existing documents when creating a project");
            }
        }

        match validated {
            Some(validated) if errors.is_empty() => Ok(validated),
            _ => Err(errors),
        }
    }
}
