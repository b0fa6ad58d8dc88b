use staffsync_auth::Identity;
use staffsync_core::{IdentityId, Organization};

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware after the token subject has been re-read
/// from the credential store, so it always reflects the stored record.
#[derive(Debug, Clone)]
pub struct CallerContext {
    identity: Identity,
}

impl CallerContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn id(&self) -> IdentityId {
        self.identity.id
    }

    pub fn organization(&self) -> &Organization {
        &self.identity.organization
    }
}
