//! User repository port.

use async_trait::async_trait;

use crate::domain::email::EmailAddress;
use crate::domain::user::{NewUser, User, UserId};

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Failures a storage collaborator may report.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    /// Uniqueness constraint violated (email already taken).
    #[error("unique constraint violated")]
    Conflict,
    #[error(transparent)]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }
}

/// Port for user persistence operations.
///
/// Every operation is atomic on its own. Email uniqueness must be enforced
/// here, the usecase only pre-checks it.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return it with its assigned identifier.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Find a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<User>;

    /// Find a user by normalized email.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<User>;

    /// Persist every mutable field of an existing user.
    async fn update(&self, user: &User) -> Result<()>;

    /// Remove a user.
    async fn delete(&self, id: UserId) -> Result<()>;
}
