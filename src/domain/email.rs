//! Email logic management.

use std::fmt;

use validator::ValidateEmail;

use crate::domain::error::{DomainError, Result};

/// Value object of a valid, normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Converts a string into a valid [`EmailAddress`].
    ///
    /// Surrounding whitespace is removed and the address is lower-cased.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is not a valid email address as
    /// defined on HTML5 spec.
    pub fn parse(email: impl AsRef<str>) -> Result<Self> {
        let email = email.as_ref().trim().to_lowercase();

        if email.validate_email() {
            Ok(Self(email))
        } else {
            Err(DomainError::InvalidEmailFormat)
        }
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let email = EmailAddress::parse("  Ana@X.com ").unwrap();
        assert_eq!(email.as_str(), "ana@x.com");
    }

    #[test]
    fn test_invalid_email() {
        assert!(EmailAddress::parse("ana").is_err());
        assert!(EmailAddress::parse("ana@").is_err());
        assert!(EmailAddress::parse("").is_err());
    }
}
