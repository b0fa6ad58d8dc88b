use std::sync::Arc;

use thiserror::Error;

use staffsync_auth::{Identity, NewIdentity};
use staffsync_core::{Email, IdentityId, Organization};

/// Credential store operation error.
///
/// These are **infrastructure errors** (constraints, isolation, backend
/// failures) as opposed to domain validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("organization already has an admin")]
    DuplicateAdmin,

    #[error("identity not found")]
    NotFound,

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistent set of identities.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - reject a create/update whose email belongs to another identity (`DuplicateEmail`)
/// - reject a second `Admin` within one organization (`DuplicateAdmin`)
/// - never change an identity's organization on update (`TenantIsolation`)
/// - return `list_by_organization` newest first (`created_at` desc, then id desc)
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Identity>, StoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, StoreError>;

    async fn list_by_organization(&self, organization: &Organization) -> Result<Vec<Identity>, StoreError>;

    /// Number of `Admin` identities across all organizations.
    async fn count_admins(&self) -> Result<u64, StoreError>;

    /// Persist a new identity, assigning its id and timestamps.
    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError>;

    /// Replace the mutable fields of an existing identity.
    async fn update(&self, identity: Identity) -> Result<Identity, StoreError>;

    async fn delete(&self, id: IdentityId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Identity>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn list_by_organization(&self, organization: &Organization) -> Result<Vec<Identity>, StoreError> {
        (**self).list_by_organization(organization).await
    }

    async fn count_admins(&self) -> Result<u64, StoreError> {
        (**self).count_admins().await
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        (**self).create(identity).await
    }

    async fn update(&self, identity: Identity) -> Result<Identity, StoreError> {
        (**self).update(identity).await
    }

    async fn delete(&self, id: IdentityId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
