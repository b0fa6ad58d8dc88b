//! Process configuration, read once at startup.
//!
//! Handlers never read the environment; `main` builds an `AppConfig` and the
//! router is assembled from it.

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use staffsync_auth::{AuthConfig, AuthConfigError, Posture};
use staffsync_core::{Email, Organization};
use staffsync_observability::LogFormat;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

const DEV_ADMIN_EMAIL: &str = "admin@example.com";
const DEV_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_ORGANIZATION: &str = "Headquarters";
const SEED_ADMIN_NAME: &str = "Super Admin";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Auth(#[from] AuthConfigError),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} is not allowed in production")]
    InsecureInProduction(&'static str),
}

/// Identity created at startup so a fresh deployment has someone to log in as.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub organization: Organization,
}

impl core::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub posture: Posture,
    pub bind_addr: SocketAddr,
    /// Postgres connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub cors_origin: String,
    pub auth: AuthConfig,
    pub seed_admin: Option<SeedAdmin>,
    /// Password given to employees added without one (development only).
    pub default_employee_password: Option<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let posture = match get("STAFFSYNC_ENV").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("development") | Some("dev") => Posture::Development,
            Some("production") | Some("prod") => Posture::Production,
            Some(_) => {
                return Err(invalid("STAFFSYNC_ENV", get("STAFFSYNC_ENV")));
            }
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| invalid("PORT", Some(raw)))?,
            None => DEFAULT_PORT,
        };
        let host = get("STAFFSYNC_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let ip: IpAddr = host.parse().map_err(|_| invalid("STAFFSYNC_BIND", Some(host.clone())))?;

        let log_format = match get("STAFFSYNC_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|_| invalid("STAFFSYNC_LOG_FORMAT", Some(raw)))?,
            None => LogFormat::default(),
        };

        let auth = AuthConfig::from_secret(get("JWT_SECRET"), posture)?;

        let default_employee_password = get("STAFFSYNC_DEFAULT_EMPLOYEE_PASSWORD");
        if posture.is_production() && default_employee_password.is_some() {
            return Err(ConfigError::InsecureInProduction("STAFFSYNC_DEFAULT_EMPLOYEE_PASSWORD"));
        }

        let seed_admin = seed_admin(&get, posture)?;

        Ok(Self {
            posture,
            bind_addr: SocketAddr::new(ip, port),
            database_url: get("DATABASE_URL"),
            cors_origin: get("STAFFSYNC_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            auth,
            seed_admin,
            default_employee_password,
            log_format,
        })
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("posture", &self.posture)
            .field("bind_addr", &self.bind_addr)
            .field("database", &self.database_url.as_ref().map(|_| "<postgres>"))
            .field("cors_origin", &self.cors_origin)
            .field("auth", &self.auth)
            .field("seed_admin", &self.seed_admin)
            .field("default_employee_password", &self.default_employee_password.as_ref().map(|_| "<redacted>"))
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn invalid(key: &'static str, value: Option<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.unwrap_or_default(),
    }
}

/// Development falls back to well-known credentials; production seeds only
/// when both email and password are given explicitly.
fn seed_admin<G>(get: &G, posture: Posture) -> Result<Option<SeedAdmin>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let (email, password) = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD"), posture) {
        (Some(email), Some(password), _) => (email, password),
        (_, _, Posture::Production) => return Ok(None),
        (email, password, Posture::Development) => (
            email.unwrap_or_else(|| DEV_ADMIN_EMAIL.to_string()),
            password.unwrap_or_else(|| DEV_ADMIN_PASSWORD.to_string()),
        ),
    };

    let email = Email::parse(&email).map_err(|_| invalid("ADMIN_EMAIL", Some(email.clone())))?;
    let organization_raw =
        get("ADMIN_ORGANIZATION").unwrap_or_else(|| DEFAULT_ADMIN_ORGANIZATION.to_string());
    let organization = Organization::parse(&organization_raw)
        .map_err(|_| invalid("ADMIN_ORGANIZATION", Some(organization_raw.clone())))?;

    Ok(Some(SeedAdmin {
        name: SEED_ADMIN_NAME.to_string(),
        email,
        password,
        organization,
    }))
}
