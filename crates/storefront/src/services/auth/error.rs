//! Authentication error types.

use thiserror::Error;

use bookstore_core::UsernameError;

use crate::db::RepositoryError;

/// Errors that can occur during signup and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password was blank.
    #[error("password is required")]
    MissingPassword,

    /// First or last name was blank.
    #[error("{0} is required")]
    MissingName(&'static str),

    /// Wrong password or unknown username.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username already registered.
    #[error("username already taken")]
    UsernameTaken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Message code carried across redirects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidUsername(_) => "invalid_username",
            Self::MissingPassword => "missing_password",
            Self::MissingName(_) => "missing_name",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UsernameTaken => "username_taken",
            Self::Repository(_) => "storage",
        }
    }
}
