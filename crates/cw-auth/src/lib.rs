//! # cw-auth
//!
//! Officer authentication for CivicWorks.
//!
//! - Argon2id password hashing
//! - Server-side sessions with expiry, behind the [`SessionStore`] trait
//! - Session cookie handling
//! - The [`Authenticator`] that resolves a request to a [`CurrentOfficer`]

pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::{AuthError, AuthResult, Authenticator, CurrentOfficer, RequestHeaders};
pub use password::{hash_password, verify_password};
pub use session::{
    extract_session_id, CookieConfig, MemorySessionStore, SameSite, Session, SessionError,
    SessionStore,
};
