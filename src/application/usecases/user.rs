//! Identity use case implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use validator::Validate;
use zeroize::Zeroizing;

use crate::application::dto::{AuthView, LoginInput, RegisterInput, UpdateUserInput, UserView};
use crate::application::error::{IdentityError, Result};
use crate::application::ports::inbound::UserUsecase;
use crate::application::ports::outbound::{
    Clock, PasswordHasher, RepositoryError, TokenIssuer, UserRepository,
};
use crate::domain::email::EmailAddress;
use crate::domain::password::PasswordHash;
use crate::domain::user::{NewUser, User, UserId};

/// Password behind the hash checked when a login names an unknown email.
const DECOY_PASSWORD: &str = "identity-hub-decoy";

/// Identity use case service.
///
/// Holds no mutable state: concurrent calls from any transport are safe as
/// long as the repository keeps each operation atomic.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    token: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
    decoy: Arc<OnceCell<PasswordHash>>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        token: Arc<dyn TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            hasher,
            token,
            clock,
            decoy: Arc::new(OnceCell::new()),
        }
    }

    /// Hash on the blocking pool, Argon2 would stall a runtime worker.
    async fn hash_password(&self, password: Zeroizing<String>) -> Result<PasswordHash> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(password.as_bytes()))
            .await
            .map_err(|err| IdentityError::Hashing(err.to_string()))?
            .map_err(IdentityError::from)
    }

    async fn verify_password(
        &self,
        password: Zeroizing<String>,
        hash: PasswordHash,
    ) -> Result<bool> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.verify(password.as_bytes(), &hash))
            .await
            .map_err(|err| IdentityError::Hashing(err.to_string()))?
            .map_err(IdentityError::from)
    }

    /// Hash built with the configured parameters on first use, so an unknown
    /// email costs the same Argon2 run as a wrong password.
    async fn decoy_hash(&self) -> Result<PasswordHash> {
        self.decoy
            .get_or_try_init(|| self.hash_password(Zeroizing::new(DECOY_PASSWORD.to_owned())))
            .await
            .cloned()
    }

    fn authenticate(&self, user: &User) -> Result<AuthView> {
        Ok(AuthView {
            token: self.token.issue(user)?,
            user: UserView::from(user),
        })
    }

    fn login_failed(reason: &'static str) -> IdentityError {
        tracing::info!(reason, "authentication failed");
        metrics::counter!("identity_login_failures_total", "reason" => reason).increment(1);

        IdentityError::InvalidCredentials
    }
}

#[async_trait]
impl UserUsecase for UserService {
    #[tracing::instrument(name = "identity.register", skip_all)]
    async fn register(&self, mut input: RegisterInput) -> Result<AuthView> {
        input.validate()?;
        let email = EmailAddress::parse(&input.email)?;

        // Fast path only, the repository uniqueness constraint is authoritative.
        match self.repo.find_by_email(&email).await {
            Ok(_) => return Err(IdentityError::DuplicateEmail),
            Err(RepositoryError::NotFound) => {},
            Err(err) => return Err(IdentityError::Storage(Box::new(err))),
        }

        let password = Zeroizing::new(std::mem::take(&mut input.password));
        let password_hash = self.hash_password(password).await?;

        let now = self.clock.now();
        let user = self
            .repo
            .create(NewUser {
                name: std::mem::take(&mut input.name),
                email,
                password_hash,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let auth = match self.authenticate(&user) {
            Ok(auth) => auth,
            Err(err) => {
                // Registration must not leave a user behind when it fails.
                if let Err(rollback) = self.repo.delete(user.id).await {
                    tracing::error!(
                        user_id = %user.id,
                        error = %rollback,
                        "failed to remove user after token failure"
                    );
                }
                return Err(err);
            },
        };

        metrics::counter!("identity_registrations_total").increment(1);
        tracing::info!(user_id = %user.id, "account created");

        Ok(auth)
    }

    #[tracing::instrument(name = "identity.login", skip_all)]
    async fn login(&self, mut input: LoginInput) -> Result<AuthView> {
        input.validate()?;
        let email = EmailAddress::parse(&input.email)?;

        let user = match self.repo.find_by_email(&email).await {
            Ok(user) => Some(user),
            Err(RepositoryError::NotFound) => None,
            Err(err) => return Err(IdentityError::Storage(Box::new(err))),
        };

        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_hash().await?,
        };
        let password = Zeroizing::new(std::mem::take(&mut input.password));
        let valid = self.verify_password(password, hash).await?;

        let user = match user {
            Some(user) if valid => user,
            Some(_) => return Err(Self::login_failed("wrong_password")),
            None => return Err(Self::login_failed("unknown_email")),
        };

        metrics::counter!("identity_logins_total").increment(1);
        tracing::info!(user_id = %user.id, "authentication successful");

        self.authenticate(&user)
    }

    #[tracing::instrument(name = "identity.get_user", skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: UserId) -> Result<UserView> {
        let user = self.repo.find_by_id(id).await?;
        Ok(UserView::from(&user))
    }

    #[tracing::instrument(name = "identity.update_user", skip(self, input), fields(user_id = %id))]
    async fn update_user(&self, id: UserId, mut input: UpdateUserInput) -> Result<UserView> {
        input.validate()?;
        let mut user = self.repo.find_by_id(id).await?;

        if let Some(name) = input.name.take() {
            user.name = name;
        }

        if let Some(email) = input.email.as_deref() {
            let email = EmailAddress::parse(email)?;
            if email != user.email {
                match self.repo.find_by_email(&email).await {
                    Ok(other) if other.id != user.id => {
                        return Err(IdentityError::DuplicateEmail);
                    },
                    Ok(_) | Err(RepositoryError::NotFound) => {},
                    Err(err) => return Err(IdentityError::Storage(Box::new(err))),
                }
                user.email = email;
            }
        }

        if let Some(password) = input.password.take() {
            user.password_hash = self.hash_password(Zeroizing::new(password)).await?;
        }

        user.updated_at = self.clock.now();
        self.repo.update(&user).await?;

        tracing::debug!("user updated");
        Ok(UserView::from(&user))
    }

    #[tracing::instrument(name = "identity.delete_user", skip(self), fields(user_id = %id))]
    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.repo.delete(id).await?;

        tracing::info!("user deleted");
        Ok(())
    }
}
