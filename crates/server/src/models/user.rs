//! User domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. None of them carry a password digest; that stays inside the
//! credential store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use latchkey_core::{Email, UserId};

/// A registered user (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name, trimmed.
    pub name: String,
    /// Normalized email address.
    pub email: Email,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a user.
///
/// `password` is the plaintext; the credential store hashes it before
/// anything is persisted.
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .field("address", &self.address)
            .finish()
    }
}

/// JSON view of a user returned by every auth endpoint.
///
/// Missing phone and address render as empty strings, which is what the
/// front end expects.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone.unwrap_or_default(),
            address: user.address.unwrap_or_default(),
        }
    }
}
