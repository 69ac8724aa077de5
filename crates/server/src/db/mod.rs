//! Credential persistence.
//!
//! # Backends
//!
//! - [`PgUserStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryUserStore`] - process-local map (tests, `LATCHKEY_STORE=memory`)
//!
//! Both enforce email uniqueness atomically at write time: Postgres through
//! the `users_email_key` unique index, memory through a single write lock.
//! Callers must not rely on a read-then-insert check for this.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p latchkey-cli -- migrate
//! ```

pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use latchkey_core::{Email, UserId};

use crate::models::User;
use crate::services::password::PasswordDigest;

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage backend for user records and their password digests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user with its digest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn insert(&self, user: &User, digest: &PasswordDigest) -> Result<(), RepositoryError>;

    /// Look a user up by normalized email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look a user up by ID.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look a user up by email together with their password digest.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordDigest)>, RepositoryError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
