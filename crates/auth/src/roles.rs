use serde::{Deserialize, Serialize};

use staffsync_core::{DomainError, DomainResult};

const ADMIN: &str = "Admin";

/// Role of an identity inside its organization.
///
/// `Admin` is reserved for the identity that created the organization. Every
/// other identity is a `Member` carrying a free-form job title with no
/// privilege attached.
///
/// On the wire a role is a plain string: `"Admin"` or the member's title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Member(String),
}

impl Role {
    /// Build a member role from a user-supplied job title.
    ///
    /// Rejects empty titles and any spelling of the reserved admin role, so a
    /// member can never be confused with the organization's admin.
    pub fn member(title: &str) -> DomainResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("role cannot be empty"));
        }
        if title.eq_ignore_ascii_case(ADMIN) {
            return Err(DomainError::validation("role 'Admin' is reserved"));
        }
        Ok(Self::Member(title.to_string()))
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may add, update, or delete employee records.
    pub fn can_manage_staff(&self) -> bool {
        match self {
            Role::Admin => true,
            Role::Member(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => ADMIN,
            Role::Member(title) => title,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value == ADMIN {
            Role::Admin
        } else {
            Role::Member(value)
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => ADMIN.to_string(),
            Role::Member(title) => title,
        }
    }
}
