// Authentication domain model and sign-in form validation
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub uid: String,
    pub email: String,
    #[serde(skip)]
    pub id_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

/// Every variant's message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Please enter email and password.")]
    MissingFields,
    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("{0}")]
    Rejected(String),
    #[error("Something went wrong, please try again.")]
    Unavailable,
}

impl AuthError {
    /// Failures caught before the provider was contacted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFields | Self::PasswordTooShort | Self::PasswordMismatch
        )
    }
}

impl Credentials {
    #[cfg(test)]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirm_password: None,
        }
    }

    #[cfg(test)]
    pub fn with_confirmation(mut self, confirm: impl Into<String>) -> Self {
        self.confirm_password = Some(confirm.into());
        self
    }

    pub fn validate(&self, mode: AuthMode) -> Result<(), AuthError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        if mode == AuthMode::SignUp && self.confirm_password.as_deref() != Some(self.password.as_str()) {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            Credentials::new("", "secret1").validate(AuthMode::SignIn),
            Err(AuthError::MissingFields)
        );
        assert_eq!(
            Credentials::new("a@b.c", "").validate(AuthMode::SignIn),
            Err(AuthError::MissingFields)
        );
    }

    #[test]
    fn test_short_password() {
        assert_eq!(
            Credentials::new("a@b.c", "12345").validate(AuthMode::SignIn),
            Err(AuthError::PasswordTooShort)
        );
    }

    #[test]
    fn test_sign_up_needs_matching_confirmation() {
        let creds = Credentials::new("a@b.c", "secret1");
        assert_eq!(creds.validate(AuthMode::SignIn), Ok(()));
        assert_eq!(creds.validate(AuthMode::SignUp), Err(AuthError::PasswordMismatch));

        let mismatched = creds.clone().with_confirmation("secret2");
        assert_eq!(mismatched.validate(AuthMode::SignUp), Err(AuthError::PasswordMismatch));

        let matched = creds.with_confirmation("secret1");
        assert_eq!(matched.validate(AuthMode::SignUp), Ok(()));
    }

    #[test]
    fn test_messages() {
        assert_eq!(AuthError::Rejected("EMAIL_NOT_FOUND".into()).to_string(), "EMAIL_NOT_FOUND");
        assert!(AuthError::PasswordTooShort.is_validation());
        assert!(!AuthError::Unavailable.is_validation());
    }
}
