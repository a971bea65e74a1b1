//! Officer model
//!
//! Table: officers. The authenticated administrative principal.

use chrono::{DateTime, Utc};
use cw_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Officer row, including the password hash.
///
/// Not `Serialize`; responses carry an [`OfficerProfile`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Officer {
    pub id: Id,
    /// Stored lowercase
    pub email: String,
    pub password_hash: String,
    pub agency: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Officer {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Officer {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Officer {
    const TABLE_NAME: &'static str = "officers";
    const TYPE_NAME: &'static str = "Officer";
}

/// Officer without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerProfile {
    pub id: Id,
    pub email: String,
    pub agency: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Officer> for OfficerProfile {
    fn from(officer: Officer) -> Self {
        Self {
            id: officer.id,
            email: officer.email,
            agency: officer.agency,
            last_login_at: officer.last_login_at,
            created_at: officer.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOfficer {
    pub email: String,
    pub password_hash: String,
    pub agency: Option<String>,
}
