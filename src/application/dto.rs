//! Data Transfer Objects for the application layer.
//!
//! DTOs are used to transfer data between adapters and the usecase without
//! exposing domain entities. None of them carries a password hash.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::email::EmailAddress;
use crate::domain::user::User;

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name"));
    }

    Ok(())
}

/// Checked after normalization, so padding and casing are accepted.
fn validate_email(email: &str) -> Result<(), ValidationError> {
    EmailAddress::parse(email)
        .map(|_| ())
        .map_err(|_| ValidationError::new("email"))
}

/// Input for account registration.
#[derive(Clone, Default, Validate, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct RegisterInput {
    #[validate(custom(function = "validate_name", message = "Name must not be empty."))]
    pub name: String,
    #[validate(custom(function = "validate_email", message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 255,
        message = "Password must contain between 6 and 255 characters."
    ))]
    pub password: String,
}

/// Input for login.
#[derive(Clone, Default, Validate, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginInput {
    #[validate(custom(function = "validate_email", message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty."))]
    pub password: String,
}

/// Input for user update. `None` means "leave unchanged".
#[derive(Clone, Default, Validate, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct UpdateUserInput {
    #[serde(default)]
    #[validate(custom(function = "validate_name", message = "Name must not be empty."))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_email", message = "Email must be formatted."))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(
        min = 6,
        max = 255,
        message = "Password must contain between 6 and 255 characters."
    ))]
    pub password: Option<String>,
}

macro_rules! redacted_debug {
    ($ty:ident { $($field:ident),* }) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    $(.field(stringify!($field), &self.$field))*
                    .field("password", &"[REDACTED]")
                    .finish()
            }
        }
    };
}

redacted_debug!(RegisterInput { name, email });
redacted_debug!(LoginInput { email });
redacted_debug!(UpdateUserInput { name, email });

/// Public representation of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.get(),
            name: user.name.clone(),
            email: user.email.to_string(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Result of a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthView {
    pub token: String,
    pub user: UserView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_email_is_valid() {
        let input = LoginInput {
            email: "  Ana@X.COM ".into(),
            password: "secret1".into(),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let input = RegisterInput {
            name: "   ".into(),
            email: "ana@x.com".into(),
            password: "secret1".into(),
        };

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("email"));

        let input = UpdateUserInput {
            name: Some("\t".into()),
            email: None,
            password: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_malformed_email_is_rejected() {
        let input = UpdateUserInput {
            name: None,
            email: Some("ana@".into()),
            password: None,
        };

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        let issue = &fields["email"][0];
        assert_eq!(issue.message.as_deref(), Some("Email must be formatted."));
    }
}
