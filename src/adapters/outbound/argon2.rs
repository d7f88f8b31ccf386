//! Argon2id password hasher implementation.

use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher as Argon2PasswordHasherTrait,
    PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::application::ports::outbound::{HashError, PasswordHasher};
use crate::config::Argon2 as ArgonConfig;
use crate::domain::password::PasswordHash;

/// Argon2id password hasher adapter, PHC string format.
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a new hasher with configured cost parameters.
    pub fn new(config: &ArgonConfig) -> Result<Self, HashError> {
        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(config.hash_length),
        )
        .map_err(|err| HashError::Argon2(err.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &[u8]) -> Result<PasswordHash, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password, &salt)
            .map_err(|err| HashError::Argon2(err.to_string()))?;

        PasswordHash::parse(hash.to_string()).map_err(|_| HashError::MalformedHash)
    }

    fn verify(&self, password: &[u8], hash: &PasswordHash) -> Result<bool, HashError> {
        let parsed = PhcHash::new(hash.as_str()).map_err(|_| HashError::MalformedHash)?;

        // Parameters are read from the PHC string, older hashes keep working
        // after a cost change.
        match self.argon2().verify_password(password, &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(HashError::Argon2(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::new(&ArgonConfig {
            memory_cost: 1024,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash(b"secret1").unwrap();

        assert!(hash.as_str().starts_with("$argon2id$v=19$"));
        assert!(hasher.verify(b"secret1", &hash).unwrap());
        assert!(!hasher.verify(b"wrong", &hash).unwrap());
    }

    #[test]
    fn test_salted() {
        let hasher = hasher();
        assert_ne!(
            hasher.hash(b"secret1").unwrap(),
            hasher.hash(b"secret1").unwrap()
        );
    }

    #[test]
    fn test_invalid_params() {
        assert!(
            Argon2Hasher::new(&ArgonConfig {
                memory_cost: 1,
                iterations: 0,
                parallelism: 1,
                hash_length: 32,
            })
            .is_err()
        );
    }
}
