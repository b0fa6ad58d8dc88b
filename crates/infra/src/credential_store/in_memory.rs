use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use staffsync_auth::{Identity, NewIdentity};
use staffsync_core::{Email, IdentityId, Organization};

use super::r#trait::{CredentialStore, StoreError};

/// In-memory credential store.
///
/// Intended for tests/dev. A single lock covers the whole map so every
/// mutation and its uniqueness checks happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    identities: RwLock<HashMap<IdentityId, Identity>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(map: &HashMap<IdentityId, Identity>, email: &Email, except: Option<IdentityId>) -> bool {
        map.values()
            .any(|i| i.email == *email && Some(i.id) != except)
    }

    fn admin_taken(map: &HashMap<IdentityId, Identity>, organization: &Organization, except: Option<IdentityId>) -> bool {
        map.values()
            .any(|i| i.role.is_admin() && i.organization == *organization && Some(i.id) != except)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Identity>, StoreError> {
        let map = self.identities.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, StoreError> {
        let map = self.identities.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|i| i.email == *email).cloned())
    }

    async fn list_by_organization(&self, organization: &Organization) -> Result<Vec<Identity>, StoreError> {
        let map = self.identities.read().map_err(|_| poisoned())?;
        let mut members: Vec<Identity> = map
            .values()
            .filter(|i| i.organization == *organization)
            .cloned()
            .collect();
        members.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(members)
    }

    async fn count_admins(&self) -> Result<u64, StoreError> {
        let map = self.identities.read().map_err(|_| poisoned())?;
        Ok(map.values().filter(|i| i.role.is_admin()).count() as u64)
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let mut map = self.identities.write().map_err(|_| poisoned())?;

        if Self::email_taken(&map, &identity.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        if identity.role.is_admin() && Self::admin_taken(&map, &identity.organization, None) {
            return Err(StoreError::DuplicateAdmin);
        }

        let identity = identity.into_identity(Utc::now());
        map.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn update(&self, identity: Identity) -> Result<Identity, StoreError> {
        let mut map = self.identities.write().map_err(|_| poisoned())?;

        let stored = map.get(&identity.id).ok_or(StoreError::NotFound)?;
        if stored.organization != identity.organization {
            return Err(StoreError::TenantIsolation(format!(
                "identity {} cannot move from '{}' to '{}'",
                identity.id, stored.organization, identity.organization
            )));
        }
        let created_at = stored.created_at;

        if Self::email_taken(&map, &identity.email, Some(identity.id)) {
            return Err(StoreError::DuplicateEmail);
        }
        if identity.role.is_admin() && Self::admin_taken(&map, &identity.organization, Some(identity.id)) {
            return Err(StoreError::DuplicateAdmin);
        }

        let updated = Identity { created_at, ..identity };
        map.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: IdentityId) -> Result<(), StoreError> {
        let mut map = self.identities.write().map_err(|_| poisoned())?;
        map.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use staffsync_auth::Role;

    fn new_identity(email: &str, org: &str, role: Role) -> NewIdentity {
        NewIdentity {
            name: "Someone".into(),
            email: Email::parse(email).unwrap(),
            phone: None,
            password_hash: "hash".into(),
            role,
            organization: Organization::parse(org).unwrap(),
        }
    }

    fn engineer() -> Role {
        Role::Member("Engineer".into())
    }

    #[tokio::test]
    async fn email_is_unique_across_organizations() {
        let store = InMemoryCredentialStore::new();
        store.create(new_identity("a@x.com", "Acme", Role::Admin)).await.unwrap();

        let err = store
            .create(new_identity("A@X.com", "Globex", Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);
    }

    #[tokio::test]
    async fn one_admin_per_organization() {
        let store = InMemoryCredentialStore::new();
        store.create(new_identity("a@acme.com", "Acme", Role::Admin)).await.unwrap();

        let err = store
            .create(new_identity("b@acme.com", "Acme", Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateAdmin);

        store.create(new_identity("c@acme.com", "Acme", engineer())).await.unwrap();
        assert_eq!(store.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_cannot_change_organization() {
        let store = InMemoryCredentialStore::new();
        let bob = store.create(new_identity("bob@acme.com", "Acme", engineer())).await.unwrap();

        let moved = Identity {
            organization: Organization::parse("Globex").unwrap(),
            ..bob
        };
        assert!(matches!(store.update(moved).await, Err(StoreError::TenantIsolation(_))));
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_identity() {
        let store = InMemoryCredentialStore::new();
        store.create(new_identity("alice@acme.com", "Acme", Role::Admin)).await.unwrap();
        let bob = store.create(new_identity("bob@acme.com", "Acme", engineer())).await.unwrap();

        let clash = Identity {
            email: Email::parse("alice@acme.com").unwrap(),
            ..bob.clone()
        };
        assert_eq!(store.update(clash).await.unwrap_err(), StoreError::DuplicateEmail);

        let renamed = Identity {
            name: "Robert".into(),
            ..bob
        };
        assert_eq!(store.update(renamed).await.unwrap().name, "Robert");
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_identity_are_not_found() {
        let store = InMemoryCredentialStore::new();
        let ghost = new_identity("ghost@acme.com", "Acme", engineer()).into_identity(Utc::now());
        assert_eq!(store.update(ghost.clone()).await.unwrap_err(), StoreError::NotFound);
        assert_eq!(store.delete(ghost.id).await.unwrap_err(), StoreError::NotFound);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = InMemoryCredentialStore::new();
        let pause = || tokio::time::sleep(std::time::Duration::from_millis(2));
        let first = store.create(new_identity("1@acme.com", "Acme", Role::Admin)).await.unwrap();
        pause().await;
        let second = store.create(new_identity("2@acme.com", "Acme", engineer())).await.unwrap();
        pause().await;
        let third = store.create(new_identity("3@acme.com", "Acme", engineer())).await.unwrap();

        let ids: Vec<_> = store
            .list_by_organization(&Organization::parse("Acme").unwrap())
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    proptest! {
        #[test]
        fn listing_never_crosses_organizations(assignments in proptest::collection::vec(0usize..3, 1..20)) {
            let orgs = ["Acme", "Globex", "Initech"];
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = InMemoryCredentialStore::new();
                for (n, org_idx) in assignments.iter().enumerate() {
                    store
                        .create(new_identity(&format!("user{n}@example.com"), orgs[*org_idx], engineer()))
                        .await
                        .unwrap();
                }

                for (idx, org) in orgs.iter().enumerate() {
                    let org = Organization::parse(org).unwrap();
                    let listed = store.list_by_organization(&org).await.unwrap();
                    prop_assert!(listed.iter().all(|i| i.organization == org));
                    let expected = assignments.iter().filter(|a| **a == idx).count();
                    prop_assert_eq!(listed.len(), expected);
                }
                Ok(())
            })?;
        }
    }
}
