//! Postgres-backed credential store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | Constraint | StoreError |
//! |------------|------------|------------|
//! | Database `23505` | `identities_email_key` | `DuplicateEmail` |
//! | Database `23505` | `identities_one_admin_per_org` | `DuplicateAdmin` |
//! | Any other | N/A | `Backend` |
//!
//! ## Tenant Isolation
//!
//! `update` filters on both `id` and `organization`, so a row can never be
//! moved to another organization through this store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use staffsync_auth::{Identity, NewIdentity, Role};
use staffsync_core::{Email, IdentityId, Organization};

use super::r#trait::{CredentialStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_identities.sql");

const SELECT_COLUMNS: &str =
    "id, name, email, phone, password_hash, role, organization, created_at, updated_at";

/// Postgres-backed credential store.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Connect to `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the embedded schema (idempotent).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn fetch_one_where(&self, clause: &str, bind: Uuid) -> Result<Option<Identity>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM identities WHERE {clause}");
        let row = sqlx::query(&sql)
            .bind(bind)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;
        row.map(|r| row_to_identity(&r)).transpose()
    }
}

#[async_trait::async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip(self), fields(identity_id = %id), err)]
    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Identity>, StoreError> {
        self.fetch_one_where("id = $1", *id.as_uuid()).await
    }

    #[instrument(skip_all, err)]
    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM identities WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;
        row.map(|r| row_to_identity(&r)).transpose()
    }

    #[instrument(skip(self), fields(organization = %organization), err)]
    async fn list_by_organization(&self, organization: &Organization) -> Result<Vec<Identity>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM identities WHERE organization = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(organization.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_by_organization", e))?;
        rows.iter().map(row_to_identity).collect()
    }

    async fn count_admins(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM identities WHERE role = 'Admin'")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_admins", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Backend(format!("failed to read count: {e}")))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip_all, fields(organization = %identity.organization), err)]
    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let identity = identity.into_identity(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO identities
                (id, name, email, phone, password_hash, role, organization, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(identity.id.as_uuid())
        .bind(&identity.name)
        .bind(identity.email.as_str())
        .bind(identity.phone.as_deref())
        .bind(&identity.password_hash)
        .bind(identity.role.as_str())
        .bind(identity.organization.as_str())
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;
        Ok(identity)
    }

    #[instrument(skip_all, fields(identity_id = %identity.id), err)]
    async fn update(&self, identity: Identity) -> Result<Identity, StoreError> {
        let sql = format!(
            r#"
            UPDATE identities
            SET name = $3, email = $4, phone = $5, password_hash = $6, role = $7, updated_at = $8
            WHERE id = $1 AND organization = $2
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(identity.id.as_uuid())
            .bind(identity.organization.as_str())
            .bind(&identity.name)
            .bind(identity.email.as_str())
            .bind(identity.phone.as_deref())
            .bind(&identity.password_hash)
            .bind(identity.role.as_str())
            .bind(identity.updated_at)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        match row {
            Some(row) => row_to_identity(&row),
            None => match self.find_by_id(identity.id).await? {
                Some(stored) => Err(StoreError::TenantIsolation(format!(
                    "identity {} cannot move from '{}' to '{}'",
                    identity.id, stored.organization, identity.organization
                ))),
                None => Err(StoreError::NotFound),
            },
        }
    }

    #[instrument(skip(self), fields(identity_id = %id), err)]
    async fn delete(&self, id: IdentityId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// SQLx row types

#[derive(Debug)]
struct IdentityRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    password_hash: String,
    role: String,
    organization: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for IdentityRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            organization: row.try_get("organization")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<IdentityRow> for Identity {
    type Error = StoreError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let corrupt = |e: staffsync_core::DomainError| {
            StoreError::Backend(format!("corrupt identity row {}: {e}", row.id))
        };
        Ok(Identity {
            id: IdentityId::from_uuid(row.id),
            email: Email::parse(&row.email).map_err(corrupt)?,
            organization: Organization::parse(&row.organization).map_err(corrupt)?,
            name: row.name,
            phone: row.phone,
            password_hash: row.password_hash,
            role: Role::from(row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn row_to_identity(row: &PgRow) -> Result<Identity, StoreError> {
    let row = IdentityRow::from_row(row)
        .map_err(|e| StoreError::Backend(format!("failed to deserialize identity row: {e}")))?;
    Identity::try_from(row)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                match db_err.constraint() {
                    Some("identities_email_key") => return StoreError::DuplicateEmail,
                    Some("identities_one_admin_per_org") => return StoreError::DuplicateAdmin,
                    _ => {}
                }
            }
            StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("{operation} failed: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs only against a real database: `DATABASE_URL=... cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn postgres_enforces_uniqueness_and_isolation() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresCredentialStore::connect(&url).await.unwrap();

        let suffix = Uuid::now_v7().simple().to_string();
        let org = Organization::parse(&format!("Acme-{suffix}")).unwrap();
        let new_identity = |email: &str, role: Role| NewIdentity {
            name: "Someone".into(),
            email: Email::parse(&format!("{suffix}-{email}")).unwrap(),
            phone: None,
            password_hash: "hash".into(),
            role,
            organization: org.clone(),
        };

        let admin = store.create(new_identity("alice@acme.com", Role::Admin)).await.unwrap();
        assert_eq!(
            store.create(new_identity("alice@acme.com", Role::Member("Engineer".into()))).await.unwrap_err(),
            StoreError::DuplicateEmail
        );
        assert_eq!(
            store.create(new_identity("carol@acme.com", Role::Admin)).await.unwrap_err(),
            StoreError::DuplicateAdmin
        );

        let moved = Identity {
            organization: Organization::parse(&format!("Globex-{suffix}")).unwrap(),
            ..admin.clone()
        };
        assert!(matches!(store.update(moved).await, Err(StoreError::TenantIsolation(_))));

        let listed = store.list_by_organization(&org).await.unwrap();
        assert_eq!(listed.len(), 1);
        store.delete(admin.id).await.unwrap();
        assert_eq!(store.find_by_id(admin.id).await.unwrap(), None);
    }
}
