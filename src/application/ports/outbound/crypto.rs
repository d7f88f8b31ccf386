//! Interfaces for cryptographic operations.

use crate::domain::password::PasswordHash;

/// Failure while hashing or parsing a credential.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("argon2 error: {0}")]
    Argon2(String),
    #[error("stored hash is malformed")]
    MalformedHash,
}

/// Port for password hashing operations.
///
/// Implementations are deliberately slow; callers run them off the request
/// dispatch threads.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password with a random salt.
    fn hash(&self, password: &[u8]) -> Result<PasswordHash, HashError>;

    /// Verify a password against a stored hash. `Ok(false)` on mismatch.
    fn verify(&self, password: &[u8], hash: &PasswordHash) -> Result<bool, HashError>;
}
