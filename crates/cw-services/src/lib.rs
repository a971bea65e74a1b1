//! # cw-services
//!
//! Business logic services for CivicWorks.
//!
//! Services validate through `cw-contracts`, persist through the `cw-db`
//! store traits and put files into `cw-storage`. They return
//! [`cw_core::CwResult`], which the API layer turns into responses.

pub mod auth;
pub mod documents;
pub mod feedback;
pub mod projects;
pub mod statistics;

#[cfg(test)]
mod testing;

pub use auth::{AuthService, LoginOutcome};
pub use documents::{DocumentWriter, StagedDocuments, StoredObject};
pub use feedback::FeedbackService;
pub use projects::{DocumentUpload, ProjectService};
pub use statistics::{DocumentCounts, ProjectStatistics};
