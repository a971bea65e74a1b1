//! Officer login, registration and sessions

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use cw_auth::password::hashing_error;
use cw_auth::{hash_password, verify_password, AuthError, CurrentOfficer, Session, SessionError, SessionStore};
use cw_contracts::{Contract, LoginContract, LoginInput, RegisterOfficerContract, RegisterOfficerInput};
use cw_core::config::AuthConfig;
use cw_core::error::{CwError, CwResult};
use cw_db::OfficerStore;
use cw_models::{NewOfficer, OfficerProfile};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// A successful login: the officer and the session that now represents them
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub officer: OfficerProfile,
    pub token: String,
    pub expires_at: chrono::DateTime<Utc>,
}

/// Checked against when the email is unknown, so both login failures cost
/// one argon2 verification
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("no officer has this password").expect("argon2 hashing of a constant password")
});

fn session_error(err: SessionError) -> CwError {
    AuthError::from(err).into()
}

fn invalid_credentials() -> CwError {
    AuthError::InvalidCredentials.into()
}

#[derive(Clone)]
pub struct AuthService {
    officers: Arc<dyn OfficerStore>,
    sessions: Arc<dyn SessionStore>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(officers: Arc<dyn OfficerStore>, sessions: Arc<dyn SessionStore>, config: AuthConfig) -> Self {
        Self {
            officers,
            sessions,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Check credentials and open a session.
    ///
    /// Unknown email and wrong password fail with the same error.
    #[instrument(skip(self, input, user_agent), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput, user_agent: Option<String>) -> CwResult<LoginOutcome> {
        let input = LoginContract.validate(input)?;

        let Some(officer) = self.officers.find_by_email(&input.email).await? else {
            let _ = verify_password(&input.password, DUMMY_HASH.as_str());
            warn!("Login failed: unknown email");
            return Err(invalid_credentials());
        };
        if !verify_password(&input.password, &officer.password_hash).map_err(hashing_error)? {
            warn!(officer_id = officer.id, "Login failed: wrong password");
            return Err(invalid_credentials());
        }

        let now = Utc::now();
        self.officers.record_login(officer.id, now).await?;

        let mut session = Session::new(
            officer.id,
            officer.email.clone(),
            officer.agency.clone(),
            self.config.session_lifetime_seconds,
        );
        if let Some(agent) = user_agent {
            session = session.with_user_agent(agent);
        }
        let token = session.id.clone();
        let expires_at = session.expires_at;
        self.sessions.set(session).await.map_err(session_error)?;

        info!(officer_id = officer.id, "Officer logged in");

        let mut profile = OfficerProfile::from(officer);
        profile.last_login_at = Some(now);
        Ok(LoginOutcome {
            officer: profile,
            token,
            expires_at,
        })
    }

    /// Create an officer account, when self registration is enabled
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterOfficerInput) -> CwResult<OfficerProfile> {
        if !self.config.self_registration {
            return Err(CwError::unauthorized("Registration is disabled"));
        }
        let registration = RegisterOfficerContract::new(self.config.password_min_length).validate(input)?;
        let password_hash = hash_password(&registration.password).map_err(hashing_error)?;

        let officer = self
            .officers
            .create(NewOfficer {
                email: registration.email,
                password_hash,
                agency: registration.agency,
            })
            .await?;

        info!(officer_id = officer.id, "Officer registered");
        Ok(officer.into())
    }

    /// Drop a session; unknown tokens are ignored
    pub async fn logout(&self, token: &str) -> CwResult<()> {
        self.sessions.delete(token).await.map_err(session_error)?;
        info!("Officer logged out");
        Ok(())
    }

    /// Profile of the authenticated officer
    pub async fn me(&self, current: &CurrentOfficer) -> CwResult<OfficerProfile> {
        self.officers
            .find_by_id(current.id)
            .await?
            .map(OfficerProfile::from)
            .ok_or_else(|| CwError::unauthorized("Officer no longer exists"))
    }
}
