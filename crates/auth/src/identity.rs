//! Identity records: organization admins and the employees they manage.
//!
//! An `Identity` carries its password hash and therefore never implements
//! `Serialize`. Anything leaving the process goes through `IdentityView`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use staffsync_core::{Email, IdentityId, Organization};

use crate::Role;

/// A person record, doubling as tenant admin and managed employee.
///
/// # Invariants
/// - `organization` is set at creation and never changes.
/// - `email` is unique across all organizations (enforced by the store).
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub organization: Organization,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn view(&self) -> IdentityView {
        IdentityView::from(self)
    }
}

impl core::fmt::Debug for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("organization", &self.organization)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A not-yet-persisted identity (password already hashed).
#[derive(Clone)]
pub struct NewIdentity {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub organization: Organization,
}

impl NewIdentity {
    /// Assign an id and creation timestamps.
    pub fn into_identity(self, now: DateTime<Utc>) -> Identity {
        Identity {
            id: IdentityId::new(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            role: self.role,
            organization: self.organization,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public projection of an identity (no password material).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityView {
    pub id: IdentityId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub role: Role,
    pub organization: Organization,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Identity> for IdentityView {
    fn from(value: &Identity) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            email: value.email.clone(),
            phone: value.phone.clone(),
            role: value.role.clone(),
            organization: value.organization.clone(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
