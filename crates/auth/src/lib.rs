//! `staffsync-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it issues and
//! verifies tokens, hashes passwords, and decides tenant access. Callers supply
//! identities; nothing here performs IO.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod identity;
pub mod password;
pub mod roles;
pub mod token;

pub use authorize::{
    authorize, authorize_staff_management, explain_decision, AuthzError, Decision,
    DecisionExplanation, DenyReason,
};
pub use claims::{validate_claims, TokenClaims, TokenValidationError};
pub use config::{AuthConfig, AuthConfigError, HashingConfig, Posture};
pub use identity::{Identity, IdentityView, NewIdentity};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use roles::Role;
pub use token::{TokenError, TokenService};
