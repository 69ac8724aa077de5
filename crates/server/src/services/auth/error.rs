//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::token::TokenError;
use crate::services::users::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed input. The message is safe to show the user.
    #[error("{0}")]
    Validation(String),

    /// The email is already registered.
    #[error("user already exists")]
    DuplicateEmail,

    /// No user with that email or ID.
    #[error("user not found")]
    NotFound,

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Credential store failure.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Token signing failure.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Repository(RepositoryError::Conflict(_)) => Self::DuplicateEmail,
            other => Self::Store(other),
        }
    }
}
