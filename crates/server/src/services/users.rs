//! Credential store.
//!
//! Wraps a [`UserStore`] backend with the password hasher so plaintext never
//! reaches storage and digests only leave it for login.

use std::sync::Arc;

use chrono::Utc;

use latchkey_core::{Email, UserId};

use super::password::{PasswordDigest, PasswordError, PasswordHasher};
use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

/// Errors from the credential store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Storage backend failure (includes `Conflict` on duplicate email).
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Password hashing failure.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The blocking hashing task was cancelled or panicked.
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// User records plus the hasher that guards their passwords.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl CredentialStore {
    /// Create a credential store over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { backend, hasher }
    }

    /// Find a user by email.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the backend fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.backend.get_by_email(email).await?)
    }

    /// Find a user by ID. The result never includes the password digest.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the backend fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.backend.get_by_id(id).await?)
    }

    /// Hash the password and persist a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository(RepositoryError::Conflict(_))` if the
    /// email is already registered; the existing record is left untouched.
    pub async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let NewUser {
            name,
            email,
            password,
            phone,
            address,
        } = new_user;

        let digest = self.hash(password).await?;

        let user = User {
            id: UserId::generate(),
            name,
            email,
            phone,
            address,
            created_at: Utc::now(),
        };

        self.backend.insert(&user, &digest).await?;
        tracing::info!(user_id = %user.id, "user created");

        Ok(user)
    }

    /// Look up a user with their digest, for password verification.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the backend fails.
    pub async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordDigest)>, StoreError> {
        Ok(self.backend.get_password_hash(email).await?)
    }

    /// Verify a candidate password against a digest off the async runtime.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Task` if the blocking task fails.
    pub async fn verify_password(
        &self,
        password: String,
        digest: PasswordDigest,
    ) -> Result<bool, StoreError> {
        let hasher = self.hasher.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &digest)).await?)
    }

    /// Check the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the backend fails.
    pub async fn ping(&self) -> Result<(), StoreError> {
        Ok(self.backend.ping().await?)
    }

    async fn hash(&self, password: String) -> Result<PasswordDigest, StoreError> {
        let hasher = self.hasher.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.hash(&password)).await??)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use crate::services::password::tests::FAST;

    fn store() -> (CredentialStore, Arc<MemoryUserStore>) {
        let backend = Arc::new(MemoryUserStore::new());
        let store = CredentialStore::new(backend.clone(), PasswordHasher::new(FAST).unwrap());
        (store, backend)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: Email::parse(email).unwrap(),
            password: "secret1".to_string(),
            phone: Some("555-0100".to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let (store, _) = store();
        let user = store.create(new_user("a@x.com")).await.unwrap();

        let (found, digest) = store.find_credentials(&user.email).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_ne!(digest.as_str(), "secret1");
        assert!(store.verify_password("secret1".into(), digest.clone()).await.unwrap());
        assert!(!store.verify_password("secret2".into(), digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_email_fails() {
        let (store, backend) = store();
        let first = store.create(new_user("a@x.com")).await.unwrap();

        let err = store.create(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Repository(RepositoryError::Conflict(_))
        ));
        assert_eq!(backend.len(), 1);
        assert_eq!(
            store.find_by_email(&first.email).await.unwrap().unwrap().id,
            first.id
        );
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registrations() {
        let (store, backend) = store();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(new_user("race@x.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let (store, _) = store();
        let user = store.create(new_user("a@x.com")).await.unwrap();

        assert_eq!(store.find_by_id(user.id).await.unwrap(), Some(user));
        assert_eq!(store.find_by_id(UserId::generate()).await.unwrap(), None);
    }
}
