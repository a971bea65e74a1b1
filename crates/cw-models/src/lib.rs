//! # cw-models
//!
//! Domain models for CivicWorks.
//!
//! Each entity maps to one table and derives `sqlx::FromRow`. Alongside the
//! persisted entities live the *drafts*: validated write records produced by
//! `cw-contracts` and consumed by the store layer.

pub use cw_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};

pub mod activity;
pub mod comment;
pub mod document;
pub mod officer;
pub mod project;
pub mod status_update;

pub use activity::{Activity, ActivityDraft};
pub use comment::{Comment, NewComment};
pub use document::{Document, DocumentEdit, NewDocument};
pub use officer::{NewOfficer, Officer, OfficerProfile};
pub use project::{Project, ProjectAggregate, ProjectDraft, ProjectStatus};
pub use status_update::{NewStatusUpdate, StatusUpdate};
