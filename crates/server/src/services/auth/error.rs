//! Authentication error types.

use thiserror::Error;

use milkround_core::{EmailError, PhoneError};

use crate::db::RepositoryError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required form field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid phone format.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The identifying field (email or phone) is already registered.
    #[error("identity already registered")]
    DuplicateIdentity,

    /// Invalid credentials (unknown identifier or wrong password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The milkman code given at customer registration does not exist.
    #[error("unknown milkman code")]
    UnknownMilkmanCode,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Short code for user-recoverable failures, used in form redirects.
    ///
    /// Returns `None` for infrastructure failures, which must surface as an
    /// error response instead of a form message.
    #[must_use]
    pub const fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(_) => Some("missing"),
            Self::InvalidEmail(_) => Some("email"),
            Self::InvalidPhone(_) => Some("phone"),
            Self::WeakPassword(_) => Some("weak_password"),
            Self::DuplicateIdentity => Some("duplicate"),
            Self::InvalidCredentials => Some("credentials"),
            Self::UnknownMilkmanCode => Some("unknown_code"),
            Self::PasswordHash | Self::Repository(_) => None,
        }
    }
}
