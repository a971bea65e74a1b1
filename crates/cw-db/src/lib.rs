//! # cw-db
//!
//! Database layer for CivicWorks.
//!
//! PostgreSQL repositories built on SQLx, the store traits the service layer
//! depends on, and an in-memory implementation of those traits.

pub mod activities;
pub mod documents;
pub mod feedback;
pub mod memory;
pub mod officers;
pub mod pool;
pub mod projects;
pub mod repository;
pub mod sessions;
pub mod store;

pub use activities::ActivityRepository;
pub use documents::DocumentRepository;
pub use feedback::FeedbackRepository;
pub use memory::MemoryStore;
pub use officers::OfficerRepository;
pub use pool::{Database, PoolStats, MIGRATOR};
pub use projects::ProjectRepository;
pub use repository::{ProjectFilter, RepositoryError, RepositoryResult};
pub use sessions::SessionRepository;
pub use store::{AggregateWrite, FeedbackStore, OfficerStore, ProjectStore};
