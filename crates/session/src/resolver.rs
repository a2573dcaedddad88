//! Effective-context resolver.
//!
//! The single place that decides which organization's data every business
//! module reads and writes. The precedence order here is the load-bearing
//! contract of the whole portal:
//!
//! 1. active impersonation → the target company;
//! 2. external client user → the company they are bound to;
//! 3. firm-admin peek → the peeked company;
//! 4. otherwise → the firm itself.
//!
//! Total: absence of data degrades to a placeholder name, never an error.

use uuid::Uuid;

use contadesk_auth::{Role, User};
use contadesk_core::{TenantId, TenantScope};
use contadesk_tenancy::{Company, Tenant};

use crate::impersonation::{ImpersonationState, Personified};
use crate::session::SessionManager;

/// Display name used when a company id cannot be resolved in the directory.
pub const MISSING_COMPANY_NAME: &str = "(unknown company)";

/// The resolved partition scope plus a human-readable banner for the chrome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveContext {
    pub scope: TenantScope,
    pub display_name: String,
}

impl EffectiveContext {
    /// Context of a signed-out device: a nil scope nothing is partitioned
    /// under, so business queries come back empty instead of failing.
    pub fn anonymous() -> Self {
        Self {
            scope: TenantScope::Firm(TenantId::from_uuid(Uuid::nil())),
            display_name: "(not signed in)".to_string(),
        }
    }
}

/// Pure resolution over the session and its optional child states.
///
/// Defensive about impossible combinations: if impersonation and a peek are
/// somehow both present, impersonation wins.
pub fn resolve_effective_context(
    user: &User,
    tenant: &Tenant,
    impersonation: Option<&ImpersonationState>,
    active_company: Option<&Company>,
) -> EffectiveContext {
    if let Some(state) = impersonation {
        return EffectiveContext {
            scope: TenantScope::Company(state.record.target_company_id),
            display_name: impersonation_banner(state),
        };
    }

    if user.role == Role::ExternalClientUser {
        if let Some(company_id) = user.tenant_scope.company_id() {
            let display_name = tenant
                .company_name(company_id)
                .unwrap_or(MISSING_COMPANY_NAME)
                .to_string();
            return EffectiveContext {
                scope: TenantScope::Company(company_id),
                display_name,
            };
        }
        // An external user bound to a firm scope is malformed data;
        // fall through to the firm context rather than failing.
    }

    if let Some(company) = active_company {
        return EffectiveContext {
            scope: TenantScope::Company(company.id),
            display_name: company.name.clone(),
        };
    }

    EffectiveContext {
        scope: TenantScope::Firm(tenant.id),
        display_name: tenant.name.clone(),
    }
}

/// Banner text shown while impersonating: who is really driving, as whom,
/// and where.
pub fn impersonation_banner(state: &ImpersonationState) -> String {
    match &state.record.personified {
        Personified::Role(role) => format!(
            "{} impersonating {} as {}",
            state.original_user.display_name, state.record.target_company_name, role
        ),
        Personified::SpecificUser { name, role, .. } => format!(
            "{} impersonating {} ({}) at {}",
            state.original_user.display_name, name, role, state.record.target_company_name
        ),
    }
}

impl SessionManager {
    /// The partition scope in force right now.
    ///
    /// This is one of the two calls business modules may make into the core.
    pub fn effective_context(&self) -> EffectiveContext {
        match &self.session {
            Some(session) => resolve_effective_context(
                &session.current_user,
                &session.current_tenant,
                session.impersonation.as_ref(),
                session.active_company.as_ref(),
            ),
            None => EffectiveContext::anonymous(),
        }
    }

    /// The acting role, `None` while anonymous.
    pub fn current_role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.current_user.role)
    }

    /// Capability check against the acting role; anonymous can do nothing.
    pub fn can(&self, capability: contadesk_auth::Capability) -> bool {
        self.current_role()
            .map(|role| contadesk_auth::has_capability(role, capability))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use proptest::prelude::*;

    use contadesk_core::{CompanyId, UserId};

    use crate::impersonation::ImpersonationRecord;

    fn firm() -> Tenant {
        let mut tenant = Tenant::new("Vega Accounting");
        tenant.upsert_company(Company::new(tenant.id, "Acme"));
        tenant
    }

    fn firm_admin(tenant: &Tenant) -> User {
        User::new(
            "Paula",
            "paula@firm.example",
            Role::FirmAdmin,
            TenantScope::Firm(tenant.id),
        )
    }

    fn impersonation_of(company: &Company, original: &User, personified: Personified) -> ImpersonationState {
        ImpersonationState {
            record: ImpersonationRecord {
                target_company_id: company.id,
                target_company_name: company.name.clone(),
                personified,
                original_role: original.role,
                started_at: Utc::now(),
            },
            original_user: original.clone(),
        }
    }

    #[test]
    fn plain_firm_admin_resolves_to_the_firm() {
        let tenant = firm();
        let user = firm_admin(&tenant);
        let ctx = resolve_effective_context(&user, &tenant, None, None);
        assert_eq!(ctx.scope, TenantScope::Firm(tenant.id));
        assert_eq!(ctx.display_name, "Vega Accounting");
    }

    #[test]
    fn peek_resolves_to_the_peeked_company() {
        let tenant = firm();
        let user = firm_admin(&tenant);
        let acme = tenant.companies[0].clone();
        let ctx = resolve_effective_context(&user, &tenant, None, Some(&acme));
        assert_eq!(ctx.scope, TenantScope::Company(acme.id));
        assert_eq!(ctx.display_name, "Acme");
    }

    #[test]
    fn impersonation_resolves_to_the_target_company_with_banner() {
        let tenant = firm();
        let user = firm_admin(&tenant);
        let acme = tenant.companies[0].clone();
        let state = impersonation_of(&acme, &user, Personified::Role(Role::ClientAdmin));

        let ctx = resolve_effective_context(&user, &tenant, Some(&state), None);
        assert_eq!(ctx.scope, TenantScope::Company(acme.id));
        assert!(ctx.display_name.contains("Paula"));
        assert!(ctx.display_name.contains("Acme"));
        assert!(ctx.display_name.contains("client_admin"));
    }

    #[test]
    fn banner_names_the_specific_personified_user() {
        let tenant = firm();
        let user = firm_admin(&tenant);
        let acme = tenant.companies[0].clone();
        let state = impersonation_of(
            &acme,
            &user,
            Personified::SpecificUser {
                user_id: UserId::new(),
                role: Role::ClientUser,
                name: "Maria".to_string(),
            },
        );

        let ctx = resolve_effective_context(&user, &tenant, Some(&state), None);
        assert!(ctx.display_name.contains("Maria"));
        assert!(ctx.display_name.contains("client_user"));
    }

    #[test]
    fn impersonation_wins_over_a_stray_peek() {
        let tenant = firm();
        let user = firm_admin(&tenant);
        let acme = tenant.companies[0].clone();
        let other = Company::new(tenant.id, "Somewhere Else");
        let state = impersonation_of(&acme, &user, Personified::Role(Role::ClientAdmin));

        let ctx = resolve_effective_context(&user, &tenant, Some(&state), Some(&other));
        assert_eq!(ctx.scope, TenantScope::Company(acme.id));
    }

    #[test]
    fn external_user_resolves_to_their_bound_company() {
        let tenant = firm();
        let acme = &tenant.companies[0];
        let mut user = User::new(
            "Rui",
            "rui@client.example",
            Role::ExternalClientUser,
            TenantScope::Company(acme.id),
        );
        user.accessible_company_ids = vec![acme.id];

        let ctx = resolve_effective_context(&user, &tenant, None, None);
        assert_eq!(ctx.scope, TenantScope::Company(acme.id));
        assert_eq!(ctx.display_name, "Acme");
    }

    #[test]
    fn external_user_bound_to_unknown_company_gets_a_placeholder() {
        let tenant = firm();
        let stray = CompanyId::new();
        let user = User::new(
            "Rui",
            "rui@client.example",
            Role::ExternalClientUser,
            TenantScope::Company(stray),
        );

        let ctx = resolve_effective_context(&user, &tenant, None, None);
        assert_eq!(ctx.scope, TenantScope::Company(stray));
        assert_eq!(ctx.display_name, MISSING_COMPANY_NAME);
    }

    #[test]
    fn external_user_with_firm_scope_falls_back_to_the_firm() {
        let tenant = firm();
        let user = User::new(
            "Rui",
            "rui@client.example",
            Role::ExternalClientUser,
            TenantScope::Firm(tenant.id),
        );

        let ctx = resolve_effective_context(&user, &tenant, None, None);
        assert_eq!(ctx.scope, TenantScope::Firm(tenant.id));
    }

    fn arb_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        /// Property: the resolver is total. Any role, any combination of
        /// present/absent child states, any stray company id — always a
        /// context, never a panic.
        #[test]
        fn resolver_is_total(
            role in arb_role(),
            bound_to_company in any::<bool>(),
            with_impersonation in any::<bool>(),
            with_peek in any::<bool>(),
            known_company in any::<bool>(),
        ) {
            let tenant = firm();
            let acme = tenant.companies[0].clone();
            let company_id = if known_company { acme.id } else { CompanyId::new() };

            let scope = if bound_to_company {
                TenantScope::Company(company_id)
            } else {
                TenantScope::Firm(tenant.id)
            };
            let user = User::new("X", "x@example.com", role, scope);

            let state = impersonation_of(&acme, &user, Personified::Role(Role::ClientAdmin));
            let impersonation = with_impersonation.then_some(&state);
            let peek = with_peek.then_some(&acme);

            let ctx = resolve_effective_context(&user, &tenant, impersonation, peek);
            prop_assert!(!ctx.display_name.is_empty());
            if with_impersonation {
                prop_assert_eq!(ctx.scope, TenantScope::Company(acme.id));
            }
        }
    }
}
