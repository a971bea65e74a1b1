//! # cw-contracts
//!
//! Request validation for CivicWorks.
//!
//! Contracts take the loosely typed payloads the API receives and turn them
//! into validated drafts from `cw-models`, or into a [`ValidationErrors`]
//! collection listing every problem at once. Nothing is written until a
//! contract has accepted the whole submission.

pub mod base;
pub mod feedback;
pub mod normalize;
pub mod officers;
pub mod projects;
pub mod upload;

pub use base::{Contract, ValidationResult};
pub use cw_core::error::ValidationErrors;
pub use upload::DecodedFile;
pub use feedback::{
    CommentContract, CommentInput, StatusUpdateContract, StatusUpdateInput, ValidatedStatusUpdate,
};
pub use officers::{
    LoginContract, LoginInput, RegisterOfficerContract, RegisterOfficerInput, Registration,
};
pub use projects::{
    CreateProjectContract, DocumentInput, ProjectSubmission, SubmissionLimits,
    UpdateProjectContract, ValidatedSubmission,
};
