//! In-process user store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use latchkey_core::{Email, UserId};

use super::{RepositoryError, UserStore};
use crate::models::User;
use crate::services::password::PasswordDigest;

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, (User, PasswordDigest)>,
    by_email: HashMap<Email, UserId>,
}

/// [`UserStore`] backed by a `HashMap` behind a lock.
///
/// The email check and the insert happen under one write lock, so concurrent
/// registrations for the same email cannot both succeed.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Whether the store holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User, digest: &PasswordDigest) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write();

        if inner.by_email.contains_key(&user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.by_email.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, (user.clone(), digest.clone()));
        Ok(())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read();
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .map(|(user, _)| user.clone()))
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.inner.read().users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordDigest)>, RepositoryError> {
        let inner = self.inner.read();
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(email: &str) -> User {
        User {
            id: UserId::generate(),
            name: "Alice".to_string(),
            email: Email::parse(email).unwrap(),
            phone: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    fn digest() -> PasswordDigest {
        PasswordDigest::new("$argon2id$v=19$m=64,t=1,p=1$c2FsdA$aGFzaA".to_owned())
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryUserStore::new();
        let alice = user("a@x.com");
        store.insert(&alice, &digest()).await.unwrap();

        assert_eq!(store.get_by_id(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(
            store.get_by_email(&alice.email).await.unwrap(),
            Some(alice.clone())
        );

        let (found, found_digest) = store.get_password_hash(&alice.email).await.unwrap().unwrap();
        assert_eq!(found, alice);
        assert_eq!(found_digest, digest());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_without_overwrite() {
        let store = MemoryUserStore::new();
        let first = user("a@x.com");
        store.insert(&first, &digest()).await.unwrap();

        let second = user("A@X.com");
        let err = store.insert(&second, &digest()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get_by_email(&first.email).await.unwrap().unwrap().id,
            first.id
        );
        assert_eq!(store.get_by_id(second.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = MemoryUserStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get_by_id(UserId::generate()).await.unwrap(), None);
        assert!(
            store
                .get_password_hash(&Email::parse("nobody@x.com").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }
}
