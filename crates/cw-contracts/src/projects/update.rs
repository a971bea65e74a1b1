//! Update contract for projects
//!
//! Activities with an id are updated in place, without one they are inserted.
//! Activities missing from the payload are kept; removal goes through
//! `removed_activity_ids`.

use std::collections::HashSet;

use cw_core::error::ValidationErrors;

use super::base::{ProjectBaseContract, SubmissionLimits};
use super::submission::ProjectSubmission;
use super::{DocumentInput, ValidatedSubmission};
use crate::base::{Contract, ValidationResult};

#[derive(Debug, Clone, Default)]
pub struct UpdateProjectContract {
    base: ProjectBaseContract,
}

impl UpdateProjectContract {
    pub fn new(limits: SubmissionLimits) -> Self {
        Self {
            base: ProjectBaseContract::new(limits),
        }
    }

    /// Each id may appear once, and never both as upsert and removal
    fn validate_ids(validated: &ValidatedSubmission, errors: &mut ValidationErrors) {
        let mut seen = HashSet::new();
        for id in validated.activities.iter().filter_map(|a| a.id) {
            if !seen.insert(id) {
                errors.add("activities", format!("activity {} appears more than once", id));
            }
        }

        let mut removed = HashSet::new();
        for &id in &validated.removed_activity_ids {
            if !removed.insert(id) {
                errors.add("removed_activity_ids", format!("activity {} is listed twice", id));
            } else if seen.contains(&id) {
                errors.add(
                    "removed_activity_ids",
                    format!("activity {} is both updated and removed", id),
                );
            }
        }

        let mut edited = HashSet::new();
        for document in &validated.documents {
            if let DocumentInput::Edit(edit) = document {
                if !edited.insert(edit.id) {
                    errors.add("documents", format!("document {} appears more than once", edit.id));
                }
            }
        }
    }
}

impl Contract<ProjectSubmission> for UpdateProjectContract {
    type Output = ValidatedSubmission;

    fn validate(&self, submission: ProjectSubmission) -> ValidationResult<ValidatedSubmission> {
        let validated = self.base.validate(submission)?;

        let mut errors = ValidationErrors::new();
        Self::validate_ids(&validated, &mut errors);
        errors.into_result().map(|()| validated)
    }
}
