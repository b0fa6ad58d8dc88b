//! Account operations: registration, login, profile and employee management.
//!
//! Every mutating employee operation goes through
//! [`authorize_staff_management`] against the *stored* target record before
//! anything is written.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use staffsync_auth::{
    authorize_staff_management, explain_decision, AuthConfig, AuthzError, Decision, Identity,
    NewIdentity, PasswordError, PasswordHasher, Role, TokenError, TokenService,
};
use staffsync_core::{DomainError, Email, IdentityId, Organization};
use staffsync_infra::{CredentialStore, StoreError};

use crate::app::dto::{
    AddEmployeeRequest, LoginRequest, RegisterRequest, UpdateEmployeeRequest, UpdateProfileRequest,
};
use crate::middleware::AuthGate;

/// Plaintext verified against when the login email is unknown, so both
/// failure paths cost one hash verification.
const TIMING_DUMMY_PASSWORD: &str = "staffsync-timing-equalizer";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("please include all fields: {0}")]
    MissingFields(String),

    #[error("{0}")]
    Validation(String),

    #[error("user already exists")]
    EmailTaken,

    #[error("organization already registered")]
    OrganizationTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Unauthorized(#[from] AuthzError),

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AccountError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateEmail => AccountError::EmailTaken,
            StoreError::DuplicateAdmin => AccountError::OrganizationTaken,
            StoreError::NotFound => AccountError::NotFound,
            StoreError::TenantIsolation(_) => AccountError::Unauthorized(AuthzError::TenantMismatch),
            other => AccountError::Store(other),
        }
    }
}

impl From<DomainError> for AccountError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => AccountError::Validation(msg),
        }
    }
}

/// An identity together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub identity: Identity,
    pub token: String,
}

/// Registration, login and employee management over a credential store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenService,
    default_employee_password: Option<String>,
    dummy_hash: Arc<str>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenService,
        default_employee_password: Option<String>,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash(TIMING_DUMMY_PASSWORD)?.into();
        Ok(Self {
            store,
            hasher,
            tokens,
            default_employee_password,
            dummy_hash,
        })
    }

    /// Create a new organization with the caller as its Admin.
    #[instrument(skip_all, fields(organization = req.organization.as_deref().unwrap_or_default()), err)]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthSession, AccountError> {
        let [name, email, password, organization] = required([
            ("name", req.name),
            ("email", req.email),
            ("password", req.password),
            ("organization", req.organization),
        ])?;
        let email = Email::parse(&email)?;
        let organization = Organization::parse(&organization)?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self.hash_password(password).await?;
        let identity = self
            .store
            .create(NewIdentity {
                name: name.trim().to_string(),
                email,
                phone: non_blank(req.phone),
                password_hash,
                role: Role::Admin,
                organization,
            })
            .await?;

        info!(identity_id = %identity.id, organization = %identity.organization, "organization registered");
        let token = self.tokens.issue(identity.id)?;
        Ok(AuthSession { identity, token })
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(skip_all, err)]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession, AccountError> {
        let [email, password] = required([("email", req.email), ("password", req.password)])?;

        let found = match Email::parse(&email) {
            Ok(email) => self.store.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(identity) = found else {
            self.verify_password(password, self.dummy_hash.to_string()).await?;
            return Err(AccountError::InvalidCredentials);
        };

        if !self.verify_password(password, identity.password_hash.clone()).await? {
            return Err(AccountError::InvalidCredentials);
        }

        debug!(identity_id = %identity.id, "login succeeded");
        let token = self.tokens.issue(identity.id)?;
        Ok(AuthSession { identity, token })
    }

    /// Update the caller's own name, email, or password; returns a fresh token.
    #[instrument(skip_all, fields(identity_id = %caller.id), err)]
    pub async fn update_profile(
        &self,
        caller: &Identity,
        req: UpdateProfileRequest,
    ) -> Result<AuthSession, AccountError> {
        let mut identity = self
            .store
            .find_by_id(caller.id)
            .await?
            .ok_or(AccountError::NotFound)?;

        if let Some(name) = non_blank(req.name) {
            identity.name = name;
        }
        if let Some(email) = non_blank(req.email) {
            identity.email = Email::parse(&email)?;
        }
        if let Some(password) = secret(req.password) {
            identity.password_hash = self.hash_password(password).await?;
        }
        identity.updated_at = Utc::now();

        let identity = self.store.update(identity).await?;
        let token = self.tokens.issue(identity.id)?;
        Ok(AuthSession { identity, token })
    }

    /// Add a Member to the caller's organization.
    #[instrument(skip_all, fields(caller_id = %caller.id), err)]
    pub async fn add_employee(&self, caller: &Identity, req: AddEmployeeRequest) -> Result<Identity, AccountError> {
        check(caller, &caller.organization)?;

        let [name, email, role] = required([("name", req.name), ("email", req.email), ("role", req.role)])?;
        let role = Role::member(&role)?;
        let email = Email::parse(&email)?;

        let password = secret(req.password)
            .or_else(|| self.default_employee_password.clone())
            .ok_or_else(|| AccountError::MissingFields("password".to_string()))?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self.hash_password(password).await?;
        let employee = self
            .store
            .create(NewIdentity {
                name: name.trim().to_string(),
                email,
                phone: non_blank(req.phone),
                password_hash,
                role,
                organization: caller.organization.clone(),
            })
            .await?;

        info!(employee_id = %employee.id, organization = %employee.organization, "employee added");
        Ok(employee)
    }

    /// Everyone in the caller's organization, newest first.
    pub async fn list_employees(&self, caller: &Identity) -> Result<Vec<Identity>, AccountError> {
        Ok(self.store.list_by_organization(&caller.organization).await?)
    }

    #[instrument(skip_all, fields(caller_id = %caller.id, target_id = %id), err)]
    pub async fn update_employee(
        &self,
        caller: &Identity,
        id: IdentityId,
        req: UpdateEmployeeRequest,
    ) -> Result<Identity, AccountError> {
        let mut target = self.store.find_by_id(id).await?.ok_or(AccountError::NotFound)?;
        check(caller, &target.organization)?;

        if let Some(organization) = non_blank(req.organization) {
            if Organization::parse(&organization)? != target.organization {
                return Err(AccountError::Validation("organization cannot be changed".to_string()));
            }
        }

        if let Some(role) = non_blank(req.role) {
            target.role = match &target.role {
                Role::Admin if role == Role::Admin.as_str() => Role::Admin,
                Role::Admin => {
                    return Err(AccountError::Validation("the admin's role cannot be changed".to_string()));
                }
                Role::Member(_) => Role::member(&role)?,
            };
        }
        if let Some(name) = non_blank(req.name) {
            target.name = name;
        }
        if let Some(email) = non_blank(req.email) {
            target.email = Email::parse(&email)?;
        }
        if let Some(phone) = req.phone {
            target.phone = non_blank(Some(phone));
        }
        if let Some(password) = secret(req.password) {
            target.password_hash = self.hash_password(password).await?;
        }
        target.updated_at = Utc::now();

        Ok(self.store.update(target).await?)
    }

    /// Remove an employee; returns the removed id.
    #[instrument(skip_all, fields(caller_id = %caller.id, target_id = %id), err)]
    pub async fn delete_employee(&self, caller: &Identity, id: IdentityId) -> Result<IdentityId, AccountError> {
        let target = self.store.find_by_id(id).await?.ok_or(AccountError::NotFound)?;
        check(caller, &target.organization)?;

        if target.id == caller.id {
            return Err(AccountError::Validation("you cannot delete your own account".to_string()));
        }

        self.store.delete(target.id).await?;
        info!(employee_id = %target.id, organization = %target.organization, "employee deleted");
        Ok(target.id)
    }

    async fn hash_password(&self, password: String) -> Result<String, AccountError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AccountError::Internal(format!("hashing task failed: {e}")))?
            .map_err(AccountError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AccountError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AccountError::Internal(format!("verification task failed: {e}")))?
            .map_err(AccountError::from)
    }
}

/// Staff-management check; denials are logged with the full explanation.
fn check(caller: &Identity, target_organization: &Organization) -> Result<(), AccountError> {
    match authorize_staff_management(caller, target_organization) {
        Decision::Allow => Ok(()),
        decision => {
            let explanation = explain_decision(caller, target_organization);
            warn!(caller_id = %caller.id, denial = ?explanation.denial, "staff management denied");
            debug!(explanation = ?explanation, "authorization decision");
            decision.into_result(caller).map_err(AccountError::from)
        }
    }
}

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Password text exactly as given, or `None` when absent or blank.
fn secret(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Every field must be present and non-blank; otherwise all missing names are reported.
/// Values come back untouched so passwords keep their surrounding whitespace.
fn required<const N: usize>(fields: [(&'static str, Option<String>); N]) -> Result<[String; N], AccountError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, v)| v.as_deref().is_none_or(|s| s.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AccountError::MissingFields(missing.join(", ")));
    }
    Ok(fields.map(|(_, v)| v.unwrap_or_default()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────────────────────────────────────

/// Shared per-process state handed to handlers.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: AccountService,
    pub gate: AuthGate,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        auth: &AuthConfig,
        default_employee_password: Option<String>,
    ) -> Result<Self, PasswordError> {
        let tokens = TokenService::new(auth);
        let gate = AuthGate::new(store.clone(), tokens.clone());
        let accounts = AccountService::new(store, hasher, tokens, default_employee_password)?;
        Ok(Self { accounts, gate })
    }
}
