//! PostgreSQL implementation for user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgQueryResult;
use sqlx::{FromRow, PgPool};

use crate::application::ports::outbound::repository::{RepositoryError, Result, UserRepository};
use crate::domain::email::EmailAddress;
use crate::domain::password::PasswordHash;
use crate::domain::user::{NewUser, User, UserId};

const USER_COLUMNS: &str = "id, name, email, password, created_at, updated_at";

/// User record as stored in the database.
#[derive(Debug, Clone, FromRow)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn try_into_user(self) -> Result<User> {
        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email: EmailAddress::parse(&self.email).map_err(RepositoryError::storage)?,
            password_hash: PasswordHash::parse(self.password).map_err(RepositoryError::storage)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Map driver errors, uniqueness violations become [`RepositoryError::Conflict`].
fn catch(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(ref db) if db.is_unique_violation() => RepositoryError::Conflict,
        err => RepositoryError::storage(err),
    }
}

fn affected(result: PgQueryResult) -> Result<()> {
    if result.rows_affected() == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new [`PgUserRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let query = format!(
            r#"INSERT INTO users (name, email, password, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {USER_COLUMNS}"#
        );

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(&user.name)
            .bind(user.email.as_str())
            .bind(user.password_hash.as_str())
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(catch)?
            .try_into_user()
    }

    async fn find_by_id(&self, id: UserId) -> Result<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(catch)?
            .try_into_user()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(catch)?
            .try_into_user()
    }

    async fn update(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"UPDATE users
                SET name = $2, email = $3, password = $4, updated_at = $5
                WHERE id = $1"#,
        )
        .bind(user.id.get())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(catch)?;

        affected(result)
    }

    async fn delete(&self, id: UserId) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(catch)?;

        affected(result)
    }
}

#[cfg(all(test, feature = "integration"))]
mod tests {
    use sqlx::{Pool, Postgres};

    use super::*;

    const PHC: &str = "$argon2id$v=19$m=1024,t=1,p=1$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG";

    fn new_user(email: &str) -> NewUser {
        let now = Utc::now();
        NewUser {
            name: "Ana".into(),
            email: EmailAddress::parse(email).unwrap(),
            password_hash: PasswordHash::parse(PHC).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[sqlx::test]
    async fn test_crud(pool: Pool<Postgres>) {
        let repo = PgUserRepository::new(pool);

        let mut user = repo.create(new_user("ana@x.com")).await.unwrap();
        assert_eq!(repo.find_by_email(&user.email).await.unwrap().id, user.id);

        user.name = "Ana Maria".into();
        repo.update(&user).await.unwrap();
        assert_eq!(repo.find_by_id(user.id).await.unwrap().name, "Ana Maria");

        repo.delete(user.id).await.unwrap();
        assert!(matches!(
            repo.find_by_id(user.id).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.delete(user.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[sqlx::test]
    async fn test_unique_violation(pool: Pool<Postgres>) {
        let repo = PgUserRepository::new(pool);

        let first = repo.create(new_user("ana@x.com")).await.unwrap();
        assert!(matches!(
            repo.create(new_user("ana@x.com")).await,
            Err(RepositoryError::Conflict)
        ));

        repo.delete(first.id).await.unwrap();
        let second = repo.create(new_user("ana@x.com")).await.unwrap();
        assert!(second.id > first.id);
    }
}
