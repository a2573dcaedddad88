//! Closed role enumeration.

use serde::{Deserialize, Serialize};

/// Every role the portal knows about.
///
/// Firm-side roles belong to accounts of the accounting firm itself;
/// client-side roles belong to accounts of a client company. The split
/// matters for impersonation: only client-side roles may be personified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    FirmAdmin,
    FirmUser,
    ClientAdmin,
    ClientUser,
    ExternalClientUser,
    ExternalAccountant,
}

impl Role {
    /// All roles, for exhaustive table tests.
    pub const ALL: [Role; 7] = [
        Role::SuperAdmin,
        Role::FirmAdmin,
        Role::FirmUser,
        Role::ClientAdmin,
        Role::ClientUser,
        Role::ExternalClientUser,
        Role::ExternalAccountant,
    ];

    pub fn is_firm_side(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::FirmAdmin | Role::FirmUser)
    }

    pub fn is_client_side(self) -> bool {
        !self.is_firm_side()
    }

    /// Whether this role may be the *target* of impersonation.
    ///
    /// Firm-side roles never are: an admin personifies a client identity,
    /// never another firm identity.
    pub fn is_assignable_for_impersonation(self) -> bool {
        matches!(
            self,
            Role::ClientAdmin
                | Role::ClientUser
                | Role::ExternalClientUser
                | Role::ExternalAccountant
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::FirmAdmin => "firm_admin",
            Role::FirmUser => "firm_user",
            Role::ClientAdmin => "client_admin",
            Role::ClientUser => "client_user",
            Role::ExternalClientUser => "external_client_user",
            Role::ExternalAccountant => "external_accountant",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
