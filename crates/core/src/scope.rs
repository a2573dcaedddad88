//! Tenant scope — the partition key of the whole portal.
//!
//! Every business collection (tasks, invoices, stock, ...) is keyed by a
//! `TenantScope`. The effective-context resolver in `contadesk-session`
//! decides which scope is currently in force; business modules must treat
//! the value as opaque.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::{CompanyId, TenantId};

/// Which organization a record or an acting user is bound to.
///
/// A firm-side user is scoped to their firm; a client-side or impersonated
/// user is scoped to a single client company.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TenantScope {
    Firm(TenantId),
    Company(CompanyId),
}

impl TenantScope {
    /// The raw identifier, regardless of which side of the boundary it names.
    pub fn as_uuid(&self) -> &Uuid {
        match self {
            TenantScope::Firm(id) => id.as_uuid(),
            TenantScope::Company(id) => id.as_uuid(),
        }
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        match self {
            TenantScope::Company(id) => Some(*id),
            TenantScope::Firm(_) => None,
        }
    }
}

impl core::fmt::Display for TenantScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self.as_uuid(), f)
    }
}
