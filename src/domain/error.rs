//! Custom error handler for domain (core).

pub type Result<T> = std::result::Result<T, DomainError>;

/// Enum representing custom domain errors.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("invalid email formatting")]
    InvalidEmailFormat,
    #[error("id must be a positive integer")]
    InvalidIdFormat,
    #[error("password hash is not a PHC string")]
    InvalidPasswordHash,
}
