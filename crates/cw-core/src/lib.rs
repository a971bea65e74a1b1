//! # cw-core
//!
//! Core types, traits, and utilities for CivicWorks.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types and the `CwResult` alias
//! - Core traits (Identifiable, Timestamped, ProjectScoped)
//! - Shared value types (date ranges)
//! - Configuration loaded from the environment

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
