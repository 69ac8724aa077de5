//! Authentication service.
//!
//! Orchestrates registration, login, and profile lookup over the credential
//! store and token issuer. Each call walks one request from validation
//! through store lookup and hash verification to either an issued session
//! or a rejection.

mod error;

pub use error::AuthError;

use latchkey_core::{Email, UserId};

use crate::models::{LoginRequest, NewUser, RegisterRequest, User};
use crate::services::token::{SessionToken, TokenIssuer};
use crate::services::users::CredentialStore;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum name length after trimming, in characters.
pub const MIN_NAME_LENGTH: usize = 2;

/// Result of a successful register or login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The authenticated user.
    pub user: User,
    /// Token to hand back in the session cookie.
    pub token: SessionToken,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a CredentialStore,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a CredentialStore, tokens: &'a TokenIssuer) -> Self {
        Self { users, tokens }
    }

    /// Register a new user and issue a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a required field is missing or malformed.
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    pub async fn register(&self, request: RegisterRequest) -> Result<IssuedSession, AuthError> {
        let new_user = validate_registration(request)?;

        // Skips the expensive hash for the common case; the store's unique
        // constraint still decides races.
        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let user = self.users.create(new_user).await?;
        self.issue(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if email or password is missing or malformed.
    /// Returns `AuthError::NotFound` if no user has that email.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, request: LoginRequest) -> Result<IssuedSession, AuthError> {
        let email = validate_email(request.email.as_deref())?;
        let password = required(request.password, "Password is required")?;

        let (user, digest) = self
            .users
            .find_credentials(&email)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self.users.verify_password(password, digest).await? {
            tracing::info!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue(user)
    }

    /// Get the profile of an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user no longer exists.
    pub async fn profile(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    fn issue(&self, user: User) -> Result<IssuedSession, AuthError> {
        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, expires_at = %token.expires_at, "session issued");
        Ok(IssuedSession { user, token })
    }
}

/// Validate a registration body into a `NewUser`.
fn validate_registration(request: RegisterRequest) -> Result<NewUser, AuthError> {
    let name = required(request.name, "Name is required")?;
    let name = name.trim().to_owned();
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "Name must be at least {MIN_NAME_LENGTH} characters long"
        )));
    }

    let email = validate_email(request.email.as_deref())?;

    let password = required(request.password, "Password is required")?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(NewUser {
        name,
        email,
        password,
        phone: optional(request.phone),
        address: optional(request.address),
    })
}

/// Require an email and check its shape.
fn validate_email(email: Option<&str>) -> Result<Email, AuthError> {
    let email = email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AuthError::Validation("Email is required".to_owned()))?;

    Email::parse(email).map_err(|_| AuthError::Validation("Please enter a valid email".to_owned()))
}

/// Require a present, non-empty field. Whitespace counts as content.
fn required(value: Option<String>, message: &str) -> Result<String, AuthError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::Validation(message.to_owned()))
}

/// Trim an optional field, treating blank as absent.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
