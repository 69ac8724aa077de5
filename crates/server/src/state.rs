//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::UserStore;
use crate::services::password::{PasswordError, PasswordHasher};
use crate::services::token::TokenIssuer;
use crate::services::users::CredentialStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Everything inside is built
/// once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    users: CredentialStore,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration (signing secret, work factor)
    /// * `backend` - User storage backend
    ///
    /// # Errors
    ///
    /// Returns an error if the configured Argon2 work factor is invalid.
    pub fn new(config: ServerConfig, backend: Arc<dyn UserStore>) -> Result<Self, PasswordError> {
        let hasher = PasswordHasher::new(config.hasher)?;
        let users = CredentialStore::new(backend, hasher);
        let tokens = TokenIssuer::new(&config.session.jwt_secret, config.session.ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                tokens,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the credential store.
    #[must_use]
    pub fn users(&self) -> &CredentialStore {
        &self.inner.users
    }

    /// Get a reference to the session token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
