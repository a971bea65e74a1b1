//! Officer login and registration inputs

use serde::Deserialize;
use validator::Validate;

use crate::base::{Contract, ValidationResult};
use crate::ValidationErrors;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Trimmed, lowercased email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterOfficerInput {
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
    #[validate(length(max = 255))]
    pub agency: Option<String>,
}

/// Accepted registration, password still in clear text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub agency: Option<String>,
}

pub struct LoginContract;

impl Contract<LoginInput> for LoginContract {
    type Output = LoginInput;

    fn validate(&self, input: LoginInput) -> ValidationResult<LoginInput> {
        let input = LoginInput {
            email: normalize_email(&input.email),
            password: input.password,
        };
        input.validate()?;
        Ok(input)
    }
}

pub struct RegisterOfficerContract {
    password_min_length: usize,
}

impl RegisterOfficerContract {
    pub fn new(password_min_length: usize) -> Self {
        Self { password_min_length }
    }
}

impl Contract<RegisterOfficerInput> for RegisterOfficerContract {
    type Output = Registration;

    fn validate(&self, input: RegisterOfficerInput) -> ValidationResult<Registration> {
        let input = RegisterOfficerInput {
            email: normalize_email(&input.email),
            password: input.password,
            agency: input
                .agency
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        };

        let mut errors = match input.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => ValidationErrors::from(e),
        };
        if input.password.chars().count() < self.password_min_length {
            errors.add(
                "password",
                format!("is too short (minimum is {} characters)", self.password_min_length),
            );
        }

        errors.into_result().map(|()| Registration {
            email: input.email,
            password: input.password,
            agency: input.agency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_normalizes_email() {
        let input = LoginContract
            .validate(LoginInput {
                email: "  Officer@Town.GOV ".into(),
                password: "secret".into(),
            })
            .unwrap();
        assert_eq!(input.email, "officer@town.gov");
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginContract
            .validate(LoginInput {
                email: " ".into(),
                password: String::new(),
            })
            .unwrap_err();
        assert!(errors.has_error("email"));
        assert!(errors.has_error("password"));
    }

    #[test]
    fn test_register() {
        let contract = RegisterOfficerContract::new(8);
        let registration = contract
            .validate(RegisterOfficerInput {
                email: "Clerk@Town.gov".into(),
                password: "long enough".into(),
                agency: Some("  ".into()),
            })
            .unwrap();
        assert_eq!(registration.email, "clerk@town.gov");
        assert_eq!(registration.agency, None);

        let errors = contract
            .validate(RegisterOfficerInput {
                email: "not-an-email".into(),
                password: "short".into(),
                agency: None,
            })
            .unwrap_err();
        assert!(errors.has_error("email"));
        assert!(errors.has_error("password"));
    }
}
