//! Project submission contracts
//!
//! - [`ProjectBaseContract`]: field-level normalization shared by create and update
//! - [`CreateProjectContract`]: new project with its first activities and documents
//! - [`UpdateProjectContract`]: edit with upserts and explicit activity removal

mod base;
mod create;
mod submission;
mod update;

pub use base::{ProjectBaseContract, SubmissionLimits, DOCUMENT_NAME_MAX};
pub use create::CreateProjectContract;
pub use submission::{ActivitySubmission, DocumentSubmission, ProjectSubmission};
pub use update::UpdateProjectContract;

use cw_core::traits::Id;
use cw_models::{ActivityDraft, DocumentEdit, NewDocument, ProjectDraft};

use crate::upload::DecodedFile;

/// Normalized document entry of a submission
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentInput {
    /// New file whose bytes must be stored first
    Upload { file: DecodedFile, name: String, is_public: bool },
    /// New row pointing at an already uploaded file
    Reference(NewDocument),
    /// Name/visibility change of an existing document
    Edit(DocumentEdit),
}

/// A submission that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub project: ProjectDraft,
    /// Non-empty activities, in submission order
    pub activities: Vec<ActivityDraft>,
    pub documents: Vec<DocumentInput>,
    pub removed_activity_ids: Vec<Id>,
}
