//! Request/response bodies for the `/api/users` routes.
//!
//! Request fields are all optional so that missing fields are reported as a
//! `missing_fields` error listing them, rather than as a JSON rejection.

use serde::{Deserialize, Serialize};

use staffsync_auth::{Identity, Role};
use staffsync_core::{Email, IdentityId, Organization};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub organization: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: IdentityId,
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub organization: Organization,
    pub token: String,
}

impl SessionResponse {
    /// Register and profile-update responses omit the role.
    pub fn without_role(identity: &Identity, token: String) -> Self {
        Self {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            role: None,
            organization: identity.organization.clone(),
            token,
        }
    }

    pub fn with_role(identity: &Identity, token: String) -> Self {
        Self {
            role: Some(identity.role.clone()),
            ..Self::without_role(identity, token)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: IdentityId,
}
