//! Status update and comment inputs

use cw_core::traits::Id;
use cw_models::{NewComment, NewStatusUpdate};
use serde::Deserialize;

use crate::base::{Contract, ValidationResult};
use crate::normalize;
use crate::upload::{self, DecodedFile};
use crate::ValidationErrors;

pub const COMMENT_MAX: usize = 2000;
pub const AUTHOR_MAX: usize = 100;
pub const FIELD_MAX: usize = 4000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentInput {
    #[serde(alias = "name", alias = "authorName")]
    pub author_name: String,
    pub content: String,
}

/// Citizen comment on a project
pub struct CommentContract {
    project_id: Id,
}

impl CommentContract {
    pub fn new(project_id: Id) -> Self {
        Self { project_id }
    }
}

impl Contract<CommentInput> for CommentContract {
    type Output = NewComment;

    fn validate(&self, input: CommentInput) -> ValidationResult<NewComment> {
        let mut errors = ValidationErrors::new();
        let author_name = required(&input.author_name, "author_name", AUTHOR_MAX, &mut errors);
        let content = required(&input.content, "content", COMMENT_MAX, &mut errors);

        errors.into_result().map(|()| NewComment {
            project_id: self.project_id,
            author_name,
            content,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdateInput {
    #[serde(alias = "activityId")]
    pub activity_id: Option<Id>,
    pub problem: Option<String>,
    pub solving: Option<String>,
    pub action: Option<String>,
    #[serde(alias = "reporterName", alias = "name")]
    pub reporter_name: String,
    pub role: Option<String>,
    /// Base64 picture, optionally as a data URL
    pub picture: Option<String>,
    #[serde(alias = "pictureName")]
    pub picture_name: Option<String>,
    /// Already uploaded picture
    #[serde(alias = "pictureUrl")]
    pub picture_url: Option<String>,
}

/// Accepted status update; `picture` still has to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedStatusUpdate {
    pub update: NewStatusUpdate,
    pub picture: Option<DecodedFile>,
}

pub struct StatusUpdateContract {
    project_id: Id,
    max_picture_size: usize,
}

impl StatusUpdateContract {
    pub fn new(project_id: Id, max_picture_size: usize) -> Self {
        Self {
            project_id,
            max_picture_size,
        }
    }
}

impl Contract<StatusUpdateInput> for StatusUpdateContract {
    type Output = ValidatedStatusUpdate;

    fn validate(&self, input: StatusUpdateInput) -> ValidationResult<ValidatedStatusUpdate> {
        let mut errors = ValidationErrors::new();

        let reporter_name = required(&input.reporter_name, "reporter_name", AUTHOR_MAX, &mut errors);
        let problem = optional(input.problem.as_deref(), "problem", &mut errors);
        let solving = optional(input.solving.as_deref(), "solving", &mut errors);
        let action = optional(input.action.as_deref(), "action", &mut errors);
        if problem.is_none() && solving.is_none() && action.is_none() {
            errors.add_base("At least one of problem, solving or action must be given");
        }
        let role = optional(input.role.as_deref(), "role", &mut errors);

        let picture_url = optional(input.picture_url.as_deref(), "picture_url", &mut errors);
        if let Some(url) = picture_url.as_deref() {
            normalize::link(url, "picture_url", &mut errors);
        }
        let picture = match input.picture.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(_) if picture_url.is_some() => {
                errors.add("picture", "cannot be combined with picture_url");
                None
            }
            Some(content) => {
                let name = input
                    .picture_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or("picture");
                match upload::decode_file(name, content, None, self.max_picture_size) {
                    Ok(file) if file.content_type.starts_with("image/") => Some(file),
                    Ok(_) => {
                        errors.add("picture", "must be an image");
                        None
                    }
                    Err(message) => {
                        errors.add("picture", message);
                        None
                    }
                }
            }
            None => None,
        };

        errors.into_result().map(|()| ValidatedStatusUpdate {
            update: NewStatusUpdate {
                project_id: self.project_id,
                activity_id: input.activity_id,
                problem,
                solving,
                action,
                reporter_name,
                role,
                picture_url,
            },
            picture,
        })
    }
}

fn required(value: &str, field: &str, max: usize, errors: &mut ValidationErrors) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, normalize::BLANK);
    } else if trimmed.chars().count() > max {
        errors.add(field, format!("is too long (maximum is {} characters)", max));
    }
    trimmed.to_string()
}

fn optional(value: Option<&str>, field: &str, errors: &mut ValidationErrors) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
    if trimmed.chars().count() > FIELD_MAX {
        errors.add(field, format!("is too long (maximum is {} characters)", FIELD_MAX));
    }
    Some(trimmed.to_string())
}
