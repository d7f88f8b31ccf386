//! Interface for token issuance.

use crate::domain::user::User;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("missing signing secret")]
    MissingSecret,
}

/// Port producing an opaque credential for an authenticated user.
///
/// The core never parses what it gets back.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<String, TokenError>;
}
