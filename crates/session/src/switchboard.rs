//! Active-context switchboard.
//!
//! Two ways of changing which company is in view without impersonation:
//! a firm admin peeking into a client company's context, and an external
//! client user moving between the companies they are entitled to see.

use tracing::warn;

use contadesk_auth::{has_capability, Capability};
use contadesk_core::{CompanyId, TenantScope};
use contadesk_infra::SessionField;

use crate::session::SessionManager;

impl SessionManager {
    /// Set or clear the firm-admin peek context.
    ///
    /// `None` clears the peek. Rejected while impersonation is active (the
    /// two mechanisms are mutually exclusive) and for roles without
    /// [`Capability::SwitchClientContext`]; rejections are warn-logged
    /// no-ops.
    pub fn switch_active_client_company(&mut self, company_id: Option<CompanyId>) {
        let Some(session) = self.session.as_mut() else {
            warn!("peek context requires an authenticated session");
            return;
        };
        if session.impersonation.is_some() {
            warn!("peek context cannot change while impersonating");
            return;
        }
        let role = session.current_user.role;
        if !has_capability(role, Capability::SwitchClientContext) {
            warn!(%role, "role may not switch client context");
            return;
        }

        let next = match company_id {
            None => None,
            Some(id) => match session.current_tenant.company(id) {
                Some(company) => Some(company.clone()),
                None => {
                    warn!(%id, "unknown company for peek context");
                    return;
                }
            },
        };

        let raw = next.as_ref().and_then(|company| Self::encode(company));
        session.active_company = next;
        self.persist(&[(SessionField::ActiveCompany, raw)]);
    }

    /// Rebind an external client user to another of their own companies.
    ///
    /// No impersonation semantics: the user is already scoped to their
    /// permitted companies and acquires no new rights. Targets outside
    /// `accessible_company_ids` are warn-logged no-ops.
    pub fn switch_active_company_for_external_user(&mut self, company_id: CompanyId) {
        let Some(session) = self.session.as_mut() else {
            warn!("company switch requires an authenticated session");
            return;
        };
        let role = session.current_user.role;
        if !has_capability(role, Capability::SwitchOwnCompanies) {
            warn!(%role, "role may not switch own companies");
            return;
        }
        if !session.current_user.may_access_company(company_id) {
            warn!(%company_id, "company not in the user's accessible list");
            return;
        }

        session.current_user.tenant_scope = TenantScope::Company(company_id);
        let raw = Self::encode(&session.current_user);
        self.persist(&[(SessionField::CurrentUser, raw)]);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use contadesk_auth::Role;
    use contadesk_infra::InMemorySessionStore;
    use contadesk_tenancy::{Company, Tenant};

    use crate::session::{LoginPolicy, SessionManager};

    use super::*;

    fn seed_policy() -> LoginPolicy {
        let mut tenant = Tenant::new("Vega Accounting");
        tenant.upsert_company(Company::new(tenant.id, "Acme"));
        tenant.upsert_company(Company::new(tenant.id, "Zephyr Logistics"));
        LoginPolicy::new(tenant)
    }

    async fn manager_as(email: &str) -> SessionManager {
        let mut manager =
            SessionManager::new(Arc::new(InMemorySessionStore::new()), seed_policy());
        manager.login(email, "123456").await.unwrap();
        manager
    }

    fn company_ids(manager: &SessionManager) -> Vec<CompanyId> {
        manager
            .session()
            .unwrap()
            .current_tenant()
            .companies
            .iter()
            .map(|c| c.id)
            .collect()
    }

    #[tokio::test]
    async fn firm_admin_sets_and_clears_the_peek() {
        let mut manager = manager_as("paula@firm.example").await;
        let acme_id = company_ids(&manager)[0];

        manager.switch_active_client_company(Some(acme_id));
        assert_eq!(
            manager.session().unwrap().active_company().map(|c| c.id),
            Some(acme_id)
        );

        manager.switch_active_client_company(None);
        assert!(manager.session().unwrap().active_company().is_none());
    }

    #[tokio::test]
    async fn unknown_company_leaves_the_peek_untouched() {
        let mut manager = manager_as("paula@firm.example").await;
        let acme_id = company_ids(&manager)[0];
        manager.switch_active_client_company(Some(acme_id));

        manager.switch_active_client_company(Some(CompanyId::new()));
        assert_eq!(
            manager.session().unwrap().active_company().map(|c| c.id),
            Some(acme_id)
        );
    }

    #[tokio::test]
    async fn peek_is_rejected_while_impersonating() {
        let mut manager = manager_as("paula@firm.example").await;
        let ids = company_ids(&manager);
        let (acme_id, zephyr_id) = (ids[0], ids[1]);

        manager.switch_active_client_company(Some(acme_id));
        manager.start_impersonation(zephyr_id, Some(Role::ClientAdmin), None);
        // starting impersonation cleared the peek
        assert!(manager.session().unwrap().active_company().is_none());

        manager.switch_active_client_company(Some(acme_id));
        assert!(manager.session().unwrap().active_company().is_none());
        assert!(manager.session().unwrap().impersonation().is_some());
    }

    #[tokio::test]
    async fn external_user_cannot_peek() {
        let mut manager = manager_as("external@client.example").await;
        let acme_id = company_ids(&manager)[0];
        manager.switch_active_client_company(Some(acme_id));
        assert!(manager.session().unwrap().active_company().is_none());
    }

    #[tokio::test]
    async fn external_user_switches_between_accessible_companies() {
        let mut manager = manager_as("external@client.example").await;
        let accessible = manager
            .session()
            .unwrap()
            .current_user()
            .accessible_company_ids
            .clone();
        assert!(accessible.len() >= 2);

        manager.switch_active_company_for_external_user(accessible[1]);
        assert_eq!(
            manager.session().unwrap().current_user().tenant_scope,
            TenantScope::Company(accessible[1])
        );
    }

    #[tokio::test]
    async fn external_user_switch_outside_accessible_list_is_rejected() {
        let mut manager = manager_as("external@client.example").await;
        let before = manager.session().unwrap().current_user().tenant_scope;

        manager.switch_active_company_for_external_user(CompanyId::new());
        assert_eq!(manager.session().unwrap().current_user().tenant_scope, before);
    }

    #[tokio::test]
    async fn firm_admin_cannot_use_the_external_switch() {
        let mut manager = manager_as("paula@firm.example").await;
        let acme_id = company_ids(&manager)[0];
        let before = manager.session().unwrap().current_user().tenant_scope;

        manager.switch_active_company_for_external_user(acme_id);
        assert_eq!(manager.session().unwrap().current_user().tenant_scope, before);
    }
}
