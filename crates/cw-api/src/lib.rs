//! # cw-api
//!
//! HTTP API for CivicWorks.
//!
//! Every response is a JSON envelope: `success`, `message` and `data` on
//! success, `success`, `error`, `message` and optional validation `details`
//! on failure.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{AppState, Backends};
pub use routes::router;
