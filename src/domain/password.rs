//! Password logic.

use crate::domain::error::{DomainError, Result};

/// A hashed password stored in the database.
///
/// Not `Serialize`, the hash never leaves the core.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Converts a [`String`] into a valid [`PasswordHash`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is not in PHC format.
    pub fn parse(phc_string: impl Into<String>) -> Result<Self> {
        let phc_string = phc_string.into();
        argon2::password_hash::PasswordHash::new(&phc_string)
            .map_err(|_| DomainError::InvalidPasswordHash)?;

        Ok(Self(phc_string))
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("phc_string", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHC: &str = "$argon2id$v=19$m=1024,t=1,p=1$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG";

    #[test]
    fn test_parse_phc() {
        let hash = PasswordHash::parse(PHC).unwrap();
        assert_eq!(hash.as_str(), PHC);
        assert!(PasswordHash::parse("secret1").is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let hash = PasswordHash::parse(PHC).unwrap();
        assert!(!format!("{hash:?}").contains("argon2id"));
    }
}
