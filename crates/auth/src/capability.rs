//! Role → capability decision table.
//!
//! Pure and total: every `(role, capability)` pair has an answer, no side
//! effects, no error path.

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Capabilities the portal gates on.
///
/// These cover the decisions this core makes itself (impersonation, context
/// switching) plus the navigation/page gates the business modules ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Assume a client-company identity (firm admins only).
    Impersonate,
    /// Peek into a client company's context without impersonating.
    SwitchClientContext,
    /// Rebind oneself to another of one's own permitted companies.
    SwitchOwnCompanies,
    ManageFirmSettings,
    ManageFirmUsers,
    ManageCompanies,
    ManageCompanyUsers,
    ViewFirmDashboard,
    ViewClientPortal,
    EmitFiscalDocuments,
}

impl Capability {
    /// All capabilities, for exhaustive table tests.
    pub const ALL: [Capability; 10] = [
        Capability::Impersonate,
        Capability::SwitchClientContext,
        Capability::SwitchOwnCompanies,
        Capability::ManageFirmSettings,
        Capability::ManageFirmUsers,
        Capability::ManageCompanies,
        Capability::ManageCompanyUsers,
        Capability::ViewFirmDashboard,
        Capability::ViewClientPortal,
        Capability::EmitFiscalDocuments,
    ];
}

/// The single authorization decision point of the portal.
///
/// Business modules must call this instead of comparing roles.
pub fn has_capability(role: Role, capability: Capability) -> bool {
    match capability {
        Capability::Impersonate | Capability::SwitchClientContext => {
            matches!(role, Role::SuperAdmin | Role::FirmAdmin)
        }
        Capability::SwitchOwnCompanies => matches!(role, Role::ExternalClientUser),
        Capability::ManageFirmSettings | Capability::ManageFirmUsers => {
            matches!(role, Role::SuperAdmin | Role::FirmAdmin)
        }
        Capability::ManageCompanies => role.is_firm_side(),
        Capability::ManageCompanyUsers => {
            role.is_firm_side() || matches!(role, Role::ClientAdmin)
        }
        Capability::ViewFirmDashboard => role.is_firm_side(),
        Capability::ViewClientPortal => role.is_client_side(),
        Capability::EmitFiscalDocuments => matches!(
            role,
            Role::SuperAdmin
                | Role::FirmAdmin
                | Role::FirmUser
                | Role::ClientAdmin
                | Role::ClientUser
                | Role::ExternalAccountant
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_total() {
        // Exhaustive sweep; the point is that no pair panics.
        for role in Role::ALL {
            for capability in Capability::ALL {
                let _ = has_capability(role, capability);
            }
        }
    }

    #[test]
    fn only_firm_admins_may_impersonate() {
        for role in Role::ALL {
            let expected = matches!(role, Role::SuperAdmin | Role::FirmAdmin);
            assert_eq!(has_capability(role, Capability::Impersonate), expected, "{role}");
        }
    }

    #[test]
    fn external_user_switches_own_companies_but_never_impersonates() {
        assert!(has_capability(Role::ExternalClientUser, Capability::SwitchOwnCompanies));
        assert!(!has_capability(Role::ExternalClientUser, Capability::Impersonate));
        assert!(!has_capability(Role::ExternalClientUser, Capability::SwitchClientContext));
    }

    #[test]
    fn client_portal_and_firm_dashboard_are_disjoint() {
        for role in Role::ALL {
            assert_ne!(
                has_capability(role, Capability::ViewFirmDashboard),
                has_capability(role, Capability::ViewClientPortal),
                "{role}"
            );
        }
    }
}
