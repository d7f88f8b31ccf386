//! These traits define what the application can do.

use async_trait::async_trait;

use crate::application::dto::{AuthView, LoginInput, RegisterInput, UpdateUserInput, UserView};
use crate::application::error::Result;
use crate::domain::user::UserId;

/// Inbound port shared by every transport adapter.
#[async_trait]
pub trait UserUsecase: Send + Sync {
    /// Create an account and authenticate it.
    async fn register(&self, input: RegisterInput) -> Result<AuthView>;

    /// Authenticate with email and password.
    async fn login(&self, input: LoginInput) -> Result<AuthView>;

    /// Read a user.
    async fn get_user(&self, id: UserId) -> Result<UserView>;

    /// Apply the fields present in `input`.
    async fn update_user(&self, id: UserId, input: UpdateUserInput) -> Result<UserView>;

    /// Remove a user.
    async fn delete_user(&self, id: UserId) -> Result<()>;
}
