//! Core traits shared by the domain models

use chrono::{DateTime, Utc};

/// Primary key type
pub type Id = i64;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Id;
}

/// Trait for entities with a creation timestamp
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

/// Trait for entities that belong to a project
pub trait ProjectScoped {
    fn project_id(&self) -> Id;
}

/// Base trait for persisted domain entities
pub trait Entity: Identifiable + Send + Sync {
    /// The database table name
    const TABLE_NAME: &'static str;

    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}
