//! Infrastructure layer: credential storage, configuration, startup bootstrap.

pub mod bootstrap;
pub mod config;
pub mod credential_store;

pub use bootstrap::{seed_admin, BootstrapError, SeedOutcome};
pub use config::{AppConfig, ConfigError, SeedAdmin};
pub use credential_store::{CredentialStore, InMemoryCredentialStore, PostgresCredentialStore, StoreError};
