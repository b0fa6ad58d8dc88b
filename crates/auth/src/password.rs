//! Password hashing using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier, Version};
use thiserror::Error;

use crate::config::HashingConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("invalid hash format: {0}")]
    MalformedHash(String),

    #[error("hashing failed: {0}")]
    Hashing(String),
}

/// One-way salted password hashing.
///
/// Implementations are CPU-bound and blocking; async callers should run them
/// on a blocking thread.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing (PHC) string.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
    /// `Err(PasswordError::MalformedHash)` if the stored hash is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id hasher with configurable cost and optional pepper.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    pepper: Option<String>,
}

impl Argon2Hasher {
    pub fn new(config: &HashingConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, 1, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self {
            params,
            pepper: config.pepper.clone(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, password: &str) -> String {
        match &self.pepper {
            Some(p) => format!("{p}{password}"),
            None => password.to_string(),
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(self.peppered(password).as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = argon2::PasswordHash::new(hash)
            .map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        // Cost parameters come from the stored hash, so hashes made under an
        // older configuration keep verifying.
        match Argon2::default().verify_password(self.peppered(password).as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hashing(e.to_string())),
        }
    }
}

impl core::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
