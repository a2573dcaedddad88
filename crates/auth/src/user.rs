//! The user identity record.

use serde::{Deserialize, Serialize};

use contadesk_core::{CompanyId, TenantScope, UserId};

use crate::roles::Role;

/// An account known to the portal.
///
/// Synthesized at login in this system (a real deployment would receive it
/// from an identity provider) and edited through the firm/company rosters.
///
/// # Invariants
/// - `tenant_scope` names the organization the account natively belongs to:
///   the firm for firm-side roles, a client company for client-side roles.
/// - `accessible_company_ids` is only populated for external client users;
///   it lists every company the account may rebind itself to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub tenant_scope: TenantScope,
    pub active: bool,
    #[serde(default)]
    pub accessible_company_ids: Vec<CompanyId>,
}

impl User {
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        tenant_scope: TenantScope,
    ) -> Self {
        Self {
            id: UserId::new(),
            display_name: display_name.into(),
            email: email.into(),
            role,
            tenant_scope,
            active: true,
            accessible_company_ids: Vec::new(),
        }
    }

    pub fn may_access_company(&self, company_id: CompanyId) -> bool {
        self.accessible_company_ids.contains(&company_id)
    }
}
