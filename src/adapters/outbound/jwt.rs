//! Manage json web tokens.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::{Clock, TokenError, TokenIssuer};
use crate::domain::user::User;

use std::sync::Arc;

pub const DEFAULT_AUDIENCE: &str = "identity-hub";
pub const EXPIRATION_TIME: u64 = 60 * 15; // 15 minutes.

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Recipients that the JWT is intended for.
    pub aud: String,
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
    pub email: String,
}

/// HMAC-signed JWT issuer.
///
/// The secret is injected once at startup.
pub struct JwtIssuer {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
    expiration: u64,
    clock: Arc<dyn Clock>,
}

impl JwtIssuer {
    /// Create a new [`JwtIssuer`] instance.
    pub fn new(
        issuer: impl Into<String>,
        secret: &[u8],
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: DEFAULT_AUDIENCE.to_owned(),
            expiration: EXPIRATION_TIME,
            clock,
        })
    }

    /// Set `audience` field on JWT.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Set token lifetime, in seconds.
    pub fn with_expiration(mut self, seconds: u64) -> Self {
        self.expiration = seconds;
        self
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = self.clock.now().timestamp().max(0) as u64;
        let claims = Claims {
            aud: self.audience.clone(),
            exp: now + self.expiration,
            iat: now,
            iss: self.issuer.clone(),
            sub: user.id.to_string(),
            email: user.email.to_string(),
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    use super::*;
    use crate::adapters::outbound::clock::SystemClock;
    use crate::domain::email::EmailAddress;
    use crate::domain::password::PasswordHash;
    use crate::domain::user::UserId;

    fn user() -> User {
        User {
            id: UserId::new(7),
            name: "Ana".into(),
            email: EmailAddress::parse("ana@x.com").unwrap(),
            password_hash: PasswordHash::parse(
                "$argon2id$v=19$m=1024,t=1,p=1$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG",
            )
            .unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn verify(issuer: &JwtIssuer, secret: &[u8], token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(issuer.algorithm);
        validation.set_audience(&[&issuer.audience]);
        validation.set_issuer(&[&issuer.issuer]);

        Ok(decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?.claims)
    }

    #[test]
    fn test_issue_and_decode() {
        let issuer = JwtIssuer::new("https://id.example.com/", b"test-secret", Arc::new(SystemClock))
            .unwrap()
            .with_audience("tests");

        let token = issuer.issue(&user()).unwrap();
        let claims = verify(&issuer, b"test-secret", &token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.aud, "tests");
        assert_eq!(claims.exp, claims.iat + EXPIRATION_TIME);
        assert!(!token.contains("argon2"));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = JwtIssuer::new("issuer", b"one", Arc::new(SystemClock)).unwrap();
        let other = JwtIssuer::new("issuer", b"two", Arc::new(SystemClock)).unwrap();

        let token = issuer.issue(&user()).unwrap();
        assert!(verify(&other, b"two", &token).is_err());
    }

    #[test]
    fn test_empty_secret() {
        assert!(matches!(
            JwtIssuer::new("issuer", b"", Arc::new(SystemClock)),
            Err(TokenError::MissingSecret)
        ));
    }
}
