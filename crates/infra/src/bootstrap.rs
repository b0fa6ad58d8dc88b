//! Startup seeding of the initial admin identity.

use thiserror::Error;
use tracing::{info, warn};

use staffsync_auth::{NewIdentity, PasswordError, PasswordHasher, Posture, Role};
use staffsync_core::IdentityId;

use crate::config::SeedAdmin;
use crate::credential_store::{CredentialStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(IdentityId),
    /// An identity with the seed email already exists.
    AlreadyPresent(IdentityId),
    /// Production: some organization already has an admin.
    SkippedAdminsExist,
    /// The seed organization already has a different admin.
    OrganizationHasAdmin,
    Disabled,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Create the seed admin if it is not there yet.
///
/// Idempotent: running it again against the same store never creates a
/// second identity.
pub async fn seed_admin<S>(
    store: &S,
    hasher: &dyn PasswordHasher,
    seed: Option<&SeedAdmin>,
    posture: Posture,
) -> Result<SeedOutcome, BootstrapError>
where
    S: CredentialStore + ?Sized,
{
    let Some(seed) = seed else {
        info!("seed admin disabled");
        return Ok(SeedOutcome::Disabled);
    };

    if posture.is_production() && store.count_admins().await? > 0 {
        info!("admins already exist; skipping seed admin");
        return Ok(SeedOutcome::SkippedAdminsExist);
    }

    if let Some(existing) = store.find_by_email(&seed.email).await? {
        return Ok(SeedOutcome::AlreadyPresent(existing.id));
    }

    let password_hash = hasher.hash(&seed.password)?;
    let new_admin = NewIdentity {
        name: seed.name.clone(),
        email: seed.email.clone(),
        phone: None,
        password_hash,
        role: Role::Admin,
        organization: seed.organization.clone(),
    };

    match store.create(new_admin).await {
        Ok(created) => {
            info!(identity_id = %created.id, organization = %created.organization, "seed admin created");
            Ok(SeedOutcome::Created(created.id))
        }
        // Another instance seeded concurrently.
        Err(StoreError::DuplicateEmail) => match store.find_by_email(&seed.email).await? {
            Some(existing) => Ok(SeedOutcome::AlreadyPresent(existing.id)),
            None => Err(StoreError::DuplicateEmail.into()),
        },
        Err(StoreError::DuplicateAdmin) => {
            warn!(organization = %seed.organization, "seed organization already has an admin; not seeding");
            Ok(SeedOutcome::OrganizationHasAdmin)
        }
        Err(e) => Err(e.into()),
    }
}
