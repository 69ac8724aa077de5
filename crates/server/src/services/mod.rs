//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Register, login, and profile orchestration
//! - `password` - Argon2id hashing with a tunable work factor
//! - `token` - Signed, time-bounded session tokens
//! - `users` - Credential store (hashing in front of the user backend)

pub mod auth;
pub mod password;
pub mod token;
pub mod users;

pub use auth::{AuthError, AuthService, IssuedSession};
pub use password::{HasherConfig, PasswordDigest, PasswordHasher};
pub use token::{SessionToken, TokenError, TokenIssuer};
pub use users::{CredentialStore, StoreError};
