//! Argon2id password hashing.
//!
//! # Invariants
//! - Every hash gets a fresh random salt and is stored in PHC format, so the
//!   cost parameters travel with the hash.
//! - Verification never reports why it failed.

use crate::config::HashingConfig;
use crate::model::user::PasswordHash;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use once_cell::sync::OnceCell;
use std::fmt::{Debug, Formatter};

// Never a real credential; hashed once so unknown-login attempts pay the
// same verification cost as wrong-password attempts.
const DECOY_PASSWORD: &str = "enrollbook-decoy-credential";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashingError(String);

pub struct CredentialHasher {
    argon2: Argon2<'static>,
    config: HashingConfig,
    decoy: OnceCell<Option<PasswordHash>>,
}

impl CredentialHasher {
    pub fn new(config: HashingConfig) -> Result<Self, HashingError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|err| HashingError(err.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            config,
            decoy: OnceCell::new(),
        })
    }

    /// Hashes `password` with a fresh salt.
    pub fn hash(&self, password: &str) -> Result<PasswordHash, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| HashingError(err.to_string()))?
            .to_string();
        Ok(PasswordHash::from_phc(phc))
    }

    /// Returns whether `password` matches `hash`.
    ///
    /// A stored hash that cannot be parsed counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        match PhcString::new(hash.as_phc()) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Runs a verification whose result is discarded.
    ///
    /// Called when the login is unknown so that path costs the same as a
    /// wrong password.
    pub fn verify_decoy(&self, password: &str) {
        let decoy = self.decoy.get_or_init(|| self.hash(DECOY_PASSWORD).ok());
        if let Some(hash) = decoy {
            let _ = self.verify(password, hash);
        }
    }

    pub fn config(&self) -> HashingConfig {
        self.config
    }
}

impl Debug for CredentialHasher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("algorithm", &"argon2id")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::CredentialHasher;
    use crate::config::HashingConfig;
    use crate::model::user::PasswordHash;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(HashingConfig::minimal()).unwrap()
    }

    #[test]
    fn hash_is_salted_phc_string() {
        let hasher = hasher();
        let first = hasher.hash("secret").unwrap();
        let second = hasher.hash("secret").unwrap();

        assert!(first.as_phc().starts_with("$argon2id$"));
        assert!(!first.as_phc().contains("secret"));
        assert_ne!(first, second);
    }

    #[test]
    fn verify_accepts_only_the_hashed_password() {
        let hasher = hasher();
        let hash = hasher.hash("secret").unwrap();

        assert!(hasher.verify("secret", &hash));
        assert!(!hasher.verify("Secret", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        let hasher = hasher();
        assert!(!hasher.verify("secret", &PasswordHash::from_phc("plaintext")));
    }

    #[test]
    fn rejects_invalid_parameters() {
        let config = HashingConfig {
            parallelism: 0,
            ..HashingConfig::minimal()
        };
        assert!(CredentialHasher::new(config).is_err());
    }

    #[test]
    fn decoy_verification_is_harmless() {
        let hasher = hasher();
        hasher.verify_decoy("anything");
        hasher.verify_decoy("anything else");
    }
}
