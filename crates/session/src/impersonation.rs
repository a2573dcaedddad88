//! Impersonation controller.
//!
//! A firm admin assumes a client-company identity, optionally a specific
//! user of that company, while an immutable snapshot of their own identity
//! waits for restoration. The acting user's capabilities become those of
//! the personified role for as long as the impersonation lasts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use contadesk_auth::{has_capability, Capability, Role, User};
use contadesk_core::{CompanyId, TenantScope, UserId};
use contadesk_infra::SessionField;
use contadesk_tenancy::Company;

use crate::session::SessionManager;

/// Who is being personified: a generic client-side role, or one concrete
/// user of the target company. One variant point, no dual optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Personified {
    Role(Role),
    SpecificUser {
        user_id: UserId,
        role: Role,
        name: String,
    },
}

impl Personified {
    /// The role whose capabilities are in force while impersonating.
    pub fn role(&self) -> Role {
        match self {
            Personified::Role(role) => *role,
            Personified::SpecificUser { role, .. } => *role,
        }
    }
}

/// The durable record of an active impersonation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpersonationRecord {
    pub target_company_id: CompanyId,
    pub target_company_name: String,
    pub personified: Personified,
    /// The role the admin had before impersonating (audit/banner use).
    pub original_role: Role,
    pub started_at: DateTime<Utc>,
}

/// Record plus the identity snapshot needed for exact restoration.
///
/// `original_user` is written once when impersonation starts and never
/// touched again until `stop_impersonation` hands it back.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpersonationState {
    pub record: ImpersonationRecord,
    pub original_user: User,
}

impl SessionManager {
    /// Begin impersonating a client company.
    ///
    /// Precedence for the personified identity: a `user_hint` naming someone
    /// in the company roster wins; otherwise a client-assignable `role_hint`;
    /// otherwise `ClientAdmin`. An unassignable `role_hint` falls back to
    /// `ClientAdmin` rather than failing (the permissive behavior callers
    /// rely on).
    ///
    /// Callers without [`Capability::Impersonate`], unknown companies, and
    /// attempts to stack impersonations are warn-logged no-ops: the session
    /// is left exactly as it was.
    pub fn start_impersonation(
        &mut self,
        company_id: CompanyId,
        role_hint: Option<Role>,
        user_hint: Option<UserId>,
    ) {
        let Some(session) = self.session.as_mut() else {
            warn!("impersonation requires an authenticated session");
            return;
        };
        if session.impersonation.is_some() {
            warn!("already impersonating; stop_impersonation must run first");
            return;
        }
        let actor_role = session.current_user.role;
        if !has_capability(actor_role, Capability::Impersonate) {
            warn!(%actor_role, "role may not impersonate");
            return;
        }
        let Some(company) = session.current_tenant.company(company_id).cloned() else {
            warn!(%company_id, "unknown company for impersonation");
            return;
        };

        let personified = resolve_personified(&company, role_hint, user_hint);
        let original_user = session.current_user.clone();
        let record = ImpersonationRecord {
            target_company_id: company.id,
            target_company_name: company.name.clone(),
            personified: personified.clone(),
            original_role: actor_role,
            started_at: Utc::now(),
        };
        let acting = acting_user(&original_user, &company, &personified);

        let user_raw = Self::encode(&acting);
        let record_raw = Self::encode(&record);
        let original_raw = Self::encode(&original_user);

        // Peek context and impersonation are mutually exclusive.
        session.active_company = None;
        session.impersonation = Some(ImpersonationState {
            record,
            original_user,
        });
        session.current_user = acting;

        // One batch: the three impersonation fields land together or not at all.
        self.persist(&[
            (SessionField::CurrentUser, user_raw),
            (SessionField::Impersonation, record_raw),
            (SessionField::OriginalUser, original_raw),
            (SessionField::ActiveCompany, None),
        ]);
        info!(company = %company.name, role = %personified.role(), "impersonation started");
    }

    /// Restore the original identity. No-op when not impersonating.
    pub fn stop_impersonation(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(state) = session.impersonation.take() else {
            return;
        };
        let original_raw = Self::encode(&state.original_user);
        session.current_user = state.original_user;

        self.persist(&[
            (SessionField::CurrentUser, original_raw),
            (SessionField::Impersonation, None),
            (SessionField::OriginalUser, None),
        ]);
        info!("impersonation stopped");
    }
}

fn resolve_personified(
    company: &Company,
    role_hint: Option<Role>,
    user_hint: Option<UserId>,
) -> Personified {
    if let Some(user_id) = user_hint {
        if let Some(user) = company.user(user_id) {
            return Personified::SpecificUser {
                user_id,
                role: user.role,
                name: user.display_name.clone(),
            };
        }
        debug!(%user_id, "personified user not in company roster, falling back");
    }
    match role_hint {
        Some(role) if role.is_assignable_for_impersonation() => Personified::Role(role),
        Some(role) => {
            debug!(%role, "role not assignable for impersonation, defaulting to client_admin");
            Personified::Role(Role::ClientAdmin)
        }
        None => Personified::Role(Role::ClientAdmin),
    }
}

/// Synthesize the acting user: same account, client-side role, scoped to the
/// target company, display name annotated so the UI shows who is really
/// driving.
fn acting_user(original: &User, company: &Company, personified: &Personified) -> User {
    let display_name = match personified {
        Personified::Role(_) => {
            format!("{} (impersonating {})", original.display_name, company.name)
        }
        Personified::SpecificUser { name, .. } => format!(
            "{} (impersonating {} at {})",
            original.display_name, name, company.name
        ),
    };
    User {
        id: original.id,
        display_name,
        email: original.email.clone(),
        role: personified.role(),
        tenant_scope: TenantScope::Company(company.id),
        active: true,
        accessible_company_ids: Vec::new(),
    }
}
