use serde::Serialize;
use thiserror::Error;

use staffsync_core::{IdentityId, Organization};

use crate::Identity;

/// Outcome of a tenant access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Caller and target belong to different organizations.
    TenantMismatch,
    /// Caller's role cannot manage staff records.
    InsufficientRole,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authorized to act on records of another organization")]
    TenantMismatch,

    #[error("forbidden: role '{0}' cannot manage employees")]
    Forbidden(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self, caller: &Identity) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::TenantMismatch) => Err(AuthzError::TenantMismatch),
            Decision::Deny(DenyReason::InsufficientRole) => {
                Err(AuthzError::Forbidden(caller.role.to_string()))
            }
        }
    }
}

/// Decide whether `caller` may act on a record owned by `target_organization`.
///
/// - No IO
/// - No panics
/// - Organization equality is the only criterion
pub fn authorize(caller: &Identity, target_organization: &Organization) -> Decision {
    if caller.organization == *target_organization {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::TenantMismatch)
    }
}

/// Tenant check followed by the staff-management privilege check.
///
/// Used for add/update/delete of employee records. Tenant mismatch is reported
/// first so a foreign caller learns nothing about role requirements.
pub fn authorize_staff_management(caller: &Identity, target_organization: &Organization) -> Decision {
    match authorize(caller, target_organization) {
        Decision::Allow if caller.role.can_manage_staff() => Decision::Allow,
        Decision::Allow => Decision::Deny(DenyReason::InsufficientRole),
        deny => deny,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable record of an authorization decision, for audit logs.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionExplanation {
    pub caller_id: IdentityId,
    pub caller_organization: Organization,
    pub caller_role: String,
    pub target_organization: Organization,
    pub granted: bool,
    pub denial: Option<DenyReason>,
    pub reason: String,
}

/// Explain a staff-management decision (what was compared and why it failed).
pub fn explain_decision(caller: &Identity, target_organization: &Organization) -> DecisionExplanation {
    let decision = authorize_staff_management(caller, target_organization);

    let (denial, reason) = match &decision {
        Decision::Allow => (None, "caller administers the target organization".to_string()),
        Decision::Deny(DenyReason::TenantMismatch) => (
            Some(DenyReason::TenantMismatch),
            format!(
                "caller belongs to '{}' but the record belongs to '{}'",
                caller.organization, target_organization
            ),
        ),
        Decision::Deny(DenyReason::InsufficientRole) => (
            Some(DenyReason::InsufficientRole),
            format!("role '{}' cannot manage employees", caller.role),
        ),
    };

    DecisionExplanation {
        caller_id: caller.id,
        caller_organization: caller.organization.clone(),
        caller_role: caller.role.to_string(),
        target_organization: target_organization.clone(),
        granted: decision.is_allowed(),
        denial,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use staffsync_core::Email;

    use crate::{NewIdentity, Role};

    fn identity(org: &str, role: Role) -> Identity {
        NewIdentity {
            name: "Someone".into(),
            email: Email::parse("someone@example.com").unwrap(),
            phone: None,
            password_hash: String::new(),
            role,
            organization: Organization::parse(org).unwrap(),
        }
        .into_identity(Utc::now())
    }

    fn org(name: &str) -> Organization {
        Organization::parse(name).unwrap()
    }

    #[test]
    fn same_organization_is_allowed() {
        let alice = identity("Acme", Role::Admin);
        assert_eq!(authorize(&alice, &org("Acme")), Decision::Allow);
    }

    #[test]
    fn other_organization_is_denied() {
        let alice = identity("Acme", Role::Admin);
        let decision = authorize(&alice, &org("Globex"));
        assert_eq!(decision, Decision::Deny(DenyReason::TenantMismatch));
        assert_eq!(decision.into_result(&alice), Err(AuthzError::TenantMismatch));
    }

    #[test]
    fn members_cannot_manage_staff() {
        let bob = identity("Acme", Role::Member("Engineer".into()));
        assert!(authorize(&bob, &org("Acme")).is_allowed());
        assert_eq!(
            authorize_staff_management(&bob, &org("Acme")),
            Decision::Deny(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn tenant_mismatch_wins_over_role() {
        let bob = identity("Acme", Role::Member("Engineer".into()));
        assert_eq!(
            authorize_staff_management(&bob, &org("Globex")),
            Decision::Deny(DenyReason::TenantMismatch)
        );
    }

    #[test]
    fn explanation_names_both_organizations() {
        let alice = identity("Acme", Role::Admin);
        let explanation = explain_decision(&alice, &org("Globex"));
        assert!(!explanation.granted);
        assert_eq!(explanation.denial, Some(DenyReason::TenantMismatch));
        assert!(explanation.reason.contains("Acme"));
        assert!(explanation.reason.contains("Globex"));
    }

    proptest! {
        #[test]
        fn allow_iff_organizations_match(a in "[A-Za-z][A-Za-z0-9 ]{0,15}", b in "[A-Za-z][A-Za-z0-9 ]{0,15}") {
            let caller = identity(&a, Role::Admin);
            let target = org(&b);
            let expected = caller.organization == target;
            prop_assert_eq!(authorize(&caller, &target).is_allowed(), expected);
            prop_assert_eq!(authorize_staff_management(&caller, &target).is_allowed(), expected);
        }
    }
}
