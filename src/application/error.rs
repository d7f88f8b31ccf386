//! Application-level errors.

use validator::{ValidationError, ValidationErrors};

use crate::application::ports::outbound::{HashError, RepositoryError, TokenError};
use crate::domain::error::DomainError;

pub type Result<T> = std::result::Result<T, IdentityError>;

/// Errors surfaced by the identity usecase to every transport.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error("email already exists")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,

    #[error("storage operation failed")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token issuance failed")]
    Token(#[from] TokenError),
}

impl IdentityError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NotFound => "NOT_FOUND",
            Self::Storage(_) | Self::Hashing(_) | Self::Token(_) => {
                "INTERNAL_SERVER_ERROR"
            },
        }
    }

    /// Single-field validation failure.
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, ValidationError::new(code).with_message(message.into()));
        Self::Validation(errors)
    }
}

impl From<RepositoryError> for IdentityError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict => Self::DuplicateEmail,
            RepositoryError::Storage(source) => Self::Storage(source),
        }
    }
}

impl From<HashError> for IdentityError {
    fn from(err: HashError) -> Self {
        Self::Hashing(err.to_string())
    }
}

impl From<DomainError> for IdentityError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidEmailFormat => {
                Self::field("email", "email", "Email must be formatted.")
            },
            DomainError::InvalidIdFormat => {
                Self::field("id", "id", "Id must be a positive integer.")
            },
            DomainError::InvalidPasswordHash => Self::Hashing(err.to_string()),
        }
    }
}
