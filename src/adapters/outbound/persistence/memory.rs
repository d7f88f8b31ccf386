//! In-memory user storage.
//!
//! Used when no PostgreSQL instance is configured and by tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::repository::{RepositoryError, Result, UserRepository};
use crate::domain::email::EmailAddress;
use crate::domain::user::{NewUser, User, UserId};

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<UserId, User>,
    emails: HashMap<EmailAddress, UserId>,
    /// Last assigned identifier, never decremented.
    sequence: i64,
}

/// Repository holding users in process memory.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    store: RwLock<Store>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.store.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut store = self.store.write().await;

        if store.emails.contains_key(&user.email) {
            return Err(RepositoryError::Conflict);
        }

        store.sequence += 1;
        let user = user.with_id(UserId::new(store.sequence));

        store.emails.insert(user.email.clone(), user.id);
        store.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User> {
        self.store
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<User> {
        let store = self.store.read().await;

        store
            .emails
            .get(email)
            .and_then(|id| store.users.get(id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut store = self.store.write().await;

        let previous_email = match store.users.get(&user.id) {
            Some(current) => current.email.clone(),
            None => return Err(RepositoryError::NotFound),
        };

        if previous_email != user.email {
            if store.emails.contains_key(&user.email) {
                return Err(RepositoryError::Conflict);
            }
            store.emails.remove(&previous_email);
            store.emails.insert(user.email.clone(), user.id);
        }

        store.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<()> {
        let mut store = self.store.write().await;

        let user = store.users.remove(&id).ok_or(RepositoryError::NotFound)?;
        store.emails.remove(&user.email);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::password::PasswordHash;

    const PHC: &str = "$argon2id$v=19$m=1024,t=1,p=1$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG";

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".into(),
            email: EmailAddress::parse(email).unwrap(),
            password_hash: PasswordHash::parse(PHC).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MemoryUserRepository::new();
        let user = repo.create(new_user("ana@x.com")).await.unwrap();

        assert_eq!(user.id, UserId::new(1));
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), user);
        assert_eq!(
            repo.find_by_email(&user.email).await.unwrap().id,
            user.id
        );
    }

    #[tokio::test]
    async fn test_unique_email() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("ana@x.com")).await.unwrap();

        assert!(matches!(
            repo.create(new_user("ana@x.com")).await,
            Err(RepositoryError::Conflict)
        ));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let repo = MemoryUserRepository::new();
        let first = repo.create(new_user("ana@x.com")).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo.create(new_user("ana@x.com")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_update_email_index() {
        let repo = MemoryUserRepository::new();
        let mut ana = repo.create(new_user("ana@x.com")).await.unwrap();
        repo.create(new_user("bob@x.com")).await.unwrap();

        ana.email = EmailAddress::parse("bob@x.com").unwrap();
        assert!(matches!(
            repo.update(&ana).await,
            Err(RepositoryError::Conflict)
        ));

        ana.email = EmailAddress::parse("ana.maria@x.com").unwrap();
        repo.update(&ana).await.unwrap();

        let old = EmailAddress::parse("ana@x.com").unwrap();
        assert!(matches!(
            repo.find_by_email(&old).await,
            Err(RepositoryError::NotFound)
        ));
        assert_eq!(repo.find_by_email(&ana.email).await.unwrap().id, ana.id);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let repo = MemoryUserRepository::new();
        let ghost = new_user("ghost@x.com").with_id(UserId::new(9));

        assert!(matches!(
            repo.find_by_id(ghost.id).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.update(&ghost).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.delete(ghost.id).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
