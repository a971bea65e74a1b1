//! Field rules shared by the create and update contracts

use cw_core::error::ValidationErrors;
use cw_models::{ActivityDraft, DocumentEdit, NewDocument, ProjectDraft};

use super::submission::{ActivitySubmission, DocumentSubmission, ProjectSubmission};
use super::{DocumentInput, ValidatedSubmission};
use crate::base::{Contract, ValidationResult};
use crate::normalize;
use crate::upload;

pub const NAME_MAX: usize = 255;
pub const CODE_MAX: usize = 50;
pub const DEPARTMENT_MAX: usize = 255;
pub const DOCUMENT_NAME_MAX: usize = 255;

/// Limits that depend on configuration
#[derive(Debug, Clone, Copy)]
pub struct SubmissionLimits {
    /// Maximum decoded size of one document
    pub max_document_size: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            max_document_size: 20 * 1024 * 1024,
        }
    }
}

/// Normalizes every field of a submission and collects all errors
#[derive(Debug, Clone, Default)]
pub struct ProjectBaseContract {
    limits: SubmissionLimits,
}

impl ProjectBaseContract {
    pub fn new(limits: SubmissionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> SubmissionLimits {
        self.limits
    }

    pub fn project_fields(
        &self,
        submission: &ProjectSubmission,
        errors: &mut ValidationErrors,
    ) -> ProjectDraft {
        let name = normalize::required_text(&submission.name, "name", errors);
        normalize::max_chars(Some(&name), NAME_MAX, "name", errors);
        let code = normalize::required_text(&submission.code, "code", errors);
        normalize::max_chars(Some(&code), CODE_MAX, "code", errors);
        let department = normalize::required_text(&submission.department, "department", errors);
        normalize::max_chars(Some(&department), DEPARTMENT_MAX, "department", errors);

        let start_date = normalize::date(&submission.start_date, "start_date", errors);
        let end_date = normalize::date(&submission.end_date, "end_date", errors);
        normalize::date_order(start_date, end_date, "end_date", errors);

        ProjectDraft {
            name,
            code,
            department,
            location: normalize::text(&submission.location, "location", errors),
            start_date,
            end_date,
            objective: normalize::text(&submission.objective, "objective", errors),
            category: normalize::text(&submission.category, "category", errors),
            budget: normalize::budget(&submission.budget, "budget", errors),
            responsible_person: normalize::text(
                &submission.responsible_person,
                "responsible_person",
                errors,
            ),
            contact: normalize::text(&submission.contact, "contact", errors),
            status: normalize::status(&submission.status, "status", errors),
        }
    }

    /// Kept activities in order; blank rows are dropped without error
    pub fn activities(
        &self,
        submitted: &[ActivitySubmission],
        errors: &mut ValidationErrors,
    ) -> Vec<ActivityDraft> {
        submitted
            .iter()
            .enumerate()
            .filter(|(_, activity)| !activity.is_blank())
            .map(|(index, activity)| {
                let mut row_errors = ValidationErrors::new();
                let description =
                    normalize::required_text(&activity.description, "description", &mut row_errors);
                let start_date = normalize::date(&activity.start_date, "start_date", &mut row_errors);
                let end_date = normalize::date(&activity.end_date, "end_date", &mut row_errors);
                normalize::date_order(start_date, end_date, "end_date", &mut row_errors);
                errors.merge_prefixed(&format!("activities[{}].", index), row_errors);

                ActivityDraft {
                    id: activity.id,
                    description,
                    start_date,
                    end_date,
                }
            })
            .collect()
    }

    pub fn documents(
        &self,
        submitted: &[DocumentSubmission],
        errors: &mut ValidationErrors,
    ) -> Vec<DocumentInput> {
        submitted
            .iter()
            .enumerate()
            .filter(|(_, document)| !document.is_blank())
            .filter_map(|(index, document)| {
                let mut row_errors = ValidationErrors::new();
                let input = self.document(document, &mut row_errors);
                errors.merge_prefixed(&format!("documents[{}].", index), row_errors);
                input
            })
            .collect()
    }

    fn document(
        &self,
        document: &DocumentSubmission,
        errors: &mut ValidationErrors,
    ) -> Option<DocumentInput> {
        let name = normalize::text(&document.name, "name", errors);
        normalize::max_chars(name.as_deref(), DOCUMENT_NAME_MAX, "name", errors);
        let is_public = normalize::flag(&document.is_public, "is_public", errors);
        let declared_type = document
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(declared) = declared_type {
            if let Err(message) = upload::check_content_type(declared) {
                errors.add("content_type", message);
            }
        }

        match (document.id, document.content(), document.url()) {
            (Some(id), None, None) => Some(DocumentInput::Edit(DocumentEdit {
                id,
                name,
                is_public,
            })),
            (Some(_), _, _) => {
                errors.add("id", "cannot be combined with new file content or url");
                None
            }
            (None, Some(_), Some(_)) => {
                errors.add("content", "cannot be combined with url");
                None
            }
            (None, None, None) => {
                errors.add("content", "must be given (or a url)");
                None
            }
            (None, content, url) => {
                let Some(name) = name else {
                    if !errors.has_error("name") {
                        errors.add("name", normalize::BLANK);
                    }
                    return None;
                };
                if errors.has_error("content_type") {
                    return None;
                }
                let is_public = is_public.unwrap_or(false);

                if let Some(content) = content {
                    match upload::decode_file(
                        &name,
                        content,
                        declared_type,
                        self.limits.max_document_size,
                    ) {
                        Ok(file) => Some(DocumentInput::Upload {
                            file,
                            name,
                            is_public,
                        }),
                        Err(message) => {
                            errors.add("content", message);
                            None
                        }
                    }
                } else {
                    url.and_then(|url| {
                        normalize::link(url, "url", errors);
                        if errors.has_error("url") {
                            return None;
                        }
                        Some(DocumentInput::Reference(NewDocument {
                            name,
                            url: url.to_string(),
                            is_public,
                            storage_key: None,
                            content_type: declared_type.map(str::to_string),
                        }))
                    })
                }
            }
        }
    }
}

impl Contract<ProjectSubmission> for ProjectBaseContract {
    type Output = ValidatedSubmission;

    fn validate(&self, submission: ProjectSubmission) -> ValidationResult<ValidatedSubmission> {
        let mut errors = ValidationErrors::new();

        let project = self.project_fields(&submission, &mut errors);
        let activities = self.activities(&submission.activities, &mut errors);
        let documents = self.documents(&submission.documents, &mut errors);

        errors.into_result().map(|()| ValidatedSubmission {
            project,
            activities,
            documents,
            removed_activity_ids: submission.removed_activity_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cw_models::ProjectStatus;
    use serde_json::json;

    fn submission(value: serde_json::Value) -> ProjectSubmission {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_road_repair_example() {
        let validated = ProjectBaseContract::default()
            .validate(submission(json!({
                "name": "Road repair",
                "code": "BG045",
                "department": "Town Hall",
                "activities": [
                    {"description": "", "start": "", "end": ""},
                    {"description": "Resurface", "start": "2026-01-01", "end": "2026-02-01"}
                ],
                "documents": []
            })))
            .unwrap();

        assert_eq!(validated.project.name, "Road repair");
        assert_eq!(validated.project.code, "BG045");
        assert_eq!(validated.project.department, "Town Hall");
        assert_eq!(validated.project.budget, None);
        assert_eq!(validated.project.status, ProjectStatus::InProgress);
        assert_eq!(validated.activities.len(), 1);
        assert_eq!(validated.activities[0].description, "Resurface");
        assert_eq!(validated.activities[0].start_date, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(validated.activities[0].end_date, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert!(validated.documents.is_empty());
    }

    #[test]
    fn test_missing_required_fields_reported_together() {
        let errors = ProjectBaseContract::default()
            .validate(submission(json!({"name": " ", "budget": "12"})))
            .unwrap_err();

        assert!(errors.has_error("name"));
        assert!(errors.has_error("code"));
        assert!(errors.has_error("department"));
    }

    #[test]
    fn test_budget_and_numeric_code() {
        let validated = ProjectBaseContract::default()
            .validate(submission(json!({
                "name": "Park", "code": 45, "department": "Parks", "budget": "0"
            })))
            .unwrap();
        assert_eq!(validated.project.code, "45");
        assert_eq!(validated.project.budget, Some(0.0));
    }

    #[test]
    fn test_activity_errors_use_submitted_index() {
        let errors = ProjectBaseContract::default()
            .validate(submission(json!({
                "name": "Park", "code": "P1", "department": "Parks",
                "activities": [
                    {"description": ""},
                    {"description": "Plant", "start": "2026-03-01", "end": "2026-02-01"}
                ]
            })))
            .unwrap_err();
        assert!(errors.has_error("activities[1].end_date"));
    }

    #[test]
    fn test_document_variants() {
        let validated = ProjectBaseContract::default()
            .validate(submission(json!({
                "name": "Park", "code": "P1", "department": "Parks",
                "documents": [
                    {"name": "plan.pdf", "content": "data:application/pdf;base64,JVBERi0xLjQ=", "public": true},
                    {"name": "photo", "url": "https://files.example.org/photo.jpg"},
                    {"id": 9, "isPublic": "false"},
                    {"name": "", "content": ""}
                ]
            })))
            .unwrap();

        assert_eq!(validated.documents.len(), 3);
        match &validated.documents[0] {
            DocumentInput::Upload { file, name, is_public } => {
                assert_eq!(name, "plan.pdf");
                assert!(is_public);
                assert_eq!(file.content_type, "application/pdf");
                assert_eq!(file.bytes, b"%PDF-1.4");
            }
            other => panic!("expected upload, got {:?}", other),
        }
        match &validated.documents[1] {
            DocumentInput::Reference(doc) => {
                assert!(!doc.is_public);
                assert_eq!(doc.storage_key, None);
            }
            other => panic!("expected reference, got {:?}", other),
        }
        assert_eq!(
            validated.documents[2],
            DocumentInput::Edit(DocumentEdit { id: 9, name: None, is_public: Some(false) })
        );
    }

    #[test]
    fn test_document_errors() {
        let contract = ProjectBaseContract::new(SubmissionLimits { max_document_size: 3 });
        let errors = contract
            .validate(submission(json!({
                "name": "Park", "code": "P1", "department": "Parks",
                "documents": [
                    {"content": "aGVsbG8="},
                    {"name": "big.txt", "content": "aGVsbG8="},
                    {"name": "bad.txt", "content": "%%%"},
                    {"name": "both", "content": "aGk=", "url": "/uploads/x"}
                ]
            })))
            .unwrap_err();

        assert!(errors.has_error("documents[0].name"));
        assert!(errors.get("documents[1].content").unwrap()[0].contains("too large"));
        assert!(errors.has_error("documents[2].content"));
        assert!(errors.has_error("documents[3].content"));
    }

    #[test]
    fn test_document_content_type_and_url_checks() {
        let errors = ProjectBaseContract::default()
            .validate(submission(json!({
                "name": "Park", "code": "P1", "department": "Parks",
                "documents": [
                    {"name": "a.pdf", "content": "JVBERi0xLjQ=", "content_type": format!("x/{}", "a".repeat(300))},
                    {"name": "b.pdf", "content": "JVBERi0xLjQ=", "content_type": "pdf"},
                    {"name": "c", "url": "/uploads/c.pdf", "content_type": "not a type"},
                    {"name": "d", "url": "javascript:alert(1)"},
                    {"name": "e", "url": "/uploads/e.pdf", "content_type": "application/pdf"}
                ]
            })))
            .unwrap_err();

        assert!(errors.get("documents[0].content_type").unwrap()[0].contains("too long"));
        assert!(errors.has_error("documents[1].content_type"));
        assert!(errors.has_error("documents[2].content_type"));
        assert!(!errors.has_error("documents[2].url"));
        assert!(errors.has_error("documents[3].url"));
        assert!(!errors.has_error("documents[4].content_type"));
        assert!(!errors.has_error("documents[4].url"));
    }
}
