//! Authentication configuration.

use chrono::Duration;
use thiserror::Error;

/// Secret used when running in development without `JWT_SECRET`.
const DEV_SECRET: &str = "staffsync-dev-secret-do-not-deploy";

/// Minimum signing secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Deployment posture. Production refuses insecure fallbacks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Posture {
    #[default]
    Development,
    Production,
}

impl Posture {
    pub fn is_production(self) -> bool {
        matches!(self, Posture::Production)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthConfigError {
    #[error("JWT_SECRET must be set in production")]
    MissingSecret,

    #[error("JWT_SECRET must be at least {MIN_PRODUCTION_SECRET_LEN} bytes in production")]
    WeakSecret,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB (default: 19_456 = 19 MiB).
    pub memory_kib: u32,
    /// Number of passes (default: 2).
    pub iterations: u32,
    /// Optional pepper prepended to passwords before hashing/verification.
    pub pepper: Option<String>,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            pepper: None,
        }
    }
}

/// Configuration for token issuance and password hashing.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret.
    pub jwt_secret: String,
    /// Token lifetime (default: 30 days).
    pub token_lifetime: Duration,
    pub hashing: HashingConfig,
}

impl AuthConfig {
    /// Build the config from an optional secret.
    ///
    /// In production a missing or short secret is an error; in development a
    /// fixed dev secret is substituted and a warning is logged.
    pub fn from_secret(secret: Option<String>, posture: Posture) -> Result<Self, AuthConfigError> {
        let secret = secret.filter(|s| !s.trim().is_empty());
        let jwt_secret = match (secret, posture) {
            (Some(s), Posture::Production) if s.len() < MIN_PRODUCTION_SECRET_LEN => {
                return Err(AuthConfigError::WeakSecret);
            }
            (Some(s), _) => s,
            (None, Posture::Production) => return Err(AuthConfigError::MissingSecret),
            (None, Posture::Development) => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_SECRET.to_string()
            }
        };

        Ok(Self {
            jwt_secret,
            token_lifetime: Duration::days(30),
            hashing: HashingConfig::default(),
        })
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("hashing", &self.hashing)
            .finish()
    }
}
