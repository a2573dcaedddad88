//! Identity session manager.
//!
//! Owns the current user, the current firm and the theme preference, and
//! mirrors every mutation to the durable store immediately.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use contadesk_auth::{Role, User};
use contadesk_core::{CompanyId, TenantScope, UserId};
use contadesk_infra::{SessionField, SessionStore};
use contadesk_tenancy::{Company, EmitterConfig, ModuleConfig, Tenant, VisualConfig};

use crate::error::AuthError;
use crate::impersonation::ImpersonationState;

/// Simulated credential-check latency for `login`.
const LOGIN_LATENCY: Duration = Duration::from_millis(150);

// ─────────────────────────────────────────────────────────────────────────────
// Theme
// ─────────────────────────────────────────────────────────────────────────────

/// Two-value UI theme. Independent of authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// The authenticated session aggregate.
///
/// # Invariants
/// - At most one impersonation is active at a time; its original-user
///   snapshot is never mutated while it is.
/// - `active_company` (the firm-admin peek) is absent whenever impersonation
///   is active.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(crate) current_user: User,
    pub(crate) current_tenant: Tenant,
    pub(crate) impersonation: Option<ImpersonationState>,
    pub(crate) active_company: Option<Company>,
}

impl Session {
    pub fn current_user(&self) -> &User {
        &self.current_user
    }

    pub fn current_tenant(&self) -> &Tenant {
        &self.current_tenant
    }

    pub fn impersonation(&self) -> Option<&ImpersonationState> {
        self.impersonation.as_ref()
    }

    pub fn active_company(&self) -> Option<&Company> {
        self.active_company.as_ref()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Login policy
// ─────────────────────────────────────────────────────────────────────────────

/// Credential and role-mapping policy for `login`.
///
/// A placeholder for a real identity provider: one shared secret, a small
/// set of reserved emails mapping to special roles, and a seed firm whose
/// company directory backs external-user access lists.
#[derive(Debug, Clone)]
pub struct LoginPolicy {
    pub shared_secret: String,
    pub super_admin_emails: Vec<String>,
    pub external_emails: Vec<String>,
    pub seed_tenant: Tenant,
}

impl LoginPolicy {
    pub fn new(seed_tenant: Tenant) -> Self {
        Self {
            shared_secret: "123456".to_string(),
            super_admin_emails: vec!["root@contadesk.app".to_string()],
            external_emails: vec!["external@client.example".to_string()],
            seed_tenant,
        }
    }

    /// Demo firm with a small company directory, for dev shells and examples.
    pub fn demo() -> Self {
        let mut tenant = Tenant::new("Contadesk Demo Accounting");
        tenant.upsert_company(Company::new(tenant.id, "Acme Ltda"));
        tenant.upsert_company(Company::new(tenant.id, "Blue Harbor Logistics"));
        Self::new(tenant)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session manager
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of reading one persisted field.
pub(crate) enum Restored<T> {
    Absent,
    Present(T),
    Corrupt,
}

/// The identity session service.
///
/// Constructed once per process and passed by reference; there is no global
/// session state anywhere else.
pub struct SessionManager {
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) policy: LoginPolicy,
    pub(crate) theme: Theme,
    pub(crate) session: Option<Session>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, policy: LoginPolicy) -> Self {
        Self {
            store,
            policy,
            theme: Theme::default(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Authenticate and open a session.
    ///
    /// The only suspending operation in this core; it completes or rejects
    /// exactly once. Any non-empty email with the shared secret is accepted;
    /// the role comes deterministically from the email (reserved addresses
    /// map to super-admin / external-client, everything else is a firm
    /// admin). A fresh login never inherits stale impersonation or peek
    /// state from a previous session on the same device.
    pub async fn login(&mut self, email: &str, secret: &str) -> Result<&Session, AuthError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || secret != self.policy.shared_secret {
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        tokio::time::sleep(LOGIN_LATENCY).await;

        let mut tenant = self.policy.seed_tenant.clone();
        let user = if self.policy.super_admin_emails.contains(&email) {
            User::new(
                display_name_from_email(&email),
                &email,
                Role::SuperAdmin,
                TenantScope::Firm(tenant.id),
            )
        } else if self.policy.external_emails.contains(&email) {
            if tenant.companies.is_empty() {
                tenant.upsert_company(Company::new(tenant.id, "Client Company"));
            }
            let accessible: Vec<CompanyId> = tenant.companies.iter().map(|c| c.id).collect();
            let bound = match accessible.first() {
                Some(first) => TenantScope::Company(*first),
                // directory was seeded above; stay total anyway
                None => TenantScope::Firm(tenant.id),
            };
            let mut user = User::new(
                display_name_from_email(&email),
                &email,
                Role::ExternalClientUser,
                bound,
            );
            user.accessible_company_ids = accessible;
            user
        } else {
            User::new(
                display_name_from_email(&email),
                &email,
                Role::FirmAdmin,
                TenantScope::Firm(tenant.id),
            )
        };

        let user_raw = Self::encode(&user);
        let tenant_raw = Self::encode(&tenant);
        let theme_raw = Self::encode(&self.theme);
        self.persist(&[
            (SessionField::CurrentUser, user_raw),
            (SessionField::CurrentTenant, tenant_raw),
            (SessionField::Theme, theme_raw),
            (SessionField::Impersonation, None),
            (SessionField::OriginalUser, None),
            (SessionField::ActiveCompany, None),
        ]);

        info!(role = %user.role, "login succeeded");
        Ok(self.session.insert(Session {
            current_user: user,
            current_tenant: tenant,
            impersonation: None,
            active_company: None,
        }))
    }

    /// Close the session and wipe every durable field. Idempotent.
    pub fn logout(&mut self) {
        self.session = None;
        self.theme = Theme::default();
        if let Err(err) = self.store.clear() {
            error!(%err, "failed to clear session store on logout");
        }
        info!("logged out");
    }

    /// Reconstruct the session from durable storage at process start.
    ///
    /// Absent fields mean anonymous. Corrupt fields are wiped rather than
    /// propagated, key by key: a corrupt session root degrades to anonymous,
    /// a corrupt child state (impersonation pair, peek) degrades to an
    /// authenticated session without that child, and the theme survives
    /// either. Nested tenant configs restore to defaults via their serde
    /// defaults.
    pub fn restore_session(&mut self) -> Option<&Session> {
        self.theme = match self.read_field::<Theme>(SessionField::Theme) {
            Restored::Present(theme) => theme,
            Restored::Absent => Theme::default(),
            Restored::Corrupt => {
                self.persist(&[(SessionField::Theme, None)]);
                Theme::default()
            }
        };

        let user = self.read_field::<User>(SessionField::CurrentUser);
        let tenant = self.read_field::<Tenant>(SessionField::CurrentTenant);
        let (user, tenant) = match (user, tenant) {
            (Restored::Present(user), Restored::Present(tenant)) => (user, tenant),
            (Restored::Absent, Restored::Absent) => {
                self.discard_orphaned_child_state();
                self.session = None;
                return None;
            }
            // A split or corrupt session root is unusable; start anonymous.
            // The theme is device state, not session state, so it survives.
            _ => {
                warn!("discarding unusable persisted session");
                self.persist(&[
                    (SessionField::CurrentUser, None),
                    (SessionField::CurrentTenant, None),
                    (SessionField::Impersonation, None),
                    (SessionField::OriginalUser, None),
                    (SessionField::ActiveCompany, None),
                ]);
                self.session = None;
                return None;
            }
        };

        let record = self.read_field(SessionField::Impersonation);
        let original = self.read_field::<User>(SessionField::OriginalUser);
        let impersonation = match (record, original) {
            (Restored::Present(record), Restored::Present(original_user)) => {
                Some(ImpersonationState {
                    record,
                    original_user,
                })
            }
            (Restored::Absent, Restored::Absent) => None,
            // The pair is written atomically; anything else is damage.
            _ => {
                warn!("discarding split or corrupt impersonation state");
                self.persist(&[
                    (SessionField::Impersonation, None),
                    (SessionField::OriginalUser, None),
                ]);
                None
            }
        };

        let mut active_company = match self.read_field::<Company>(SessionField::ActiveCompany) {
            Restored::Present(company) => Some(company),
            Restored::Absent => None,
            Restored::Corrupt => {
                self.persist(&[(SessionField::ActiveCompany, None)]);
                None
            }
        };

        if impersonation.is_some() && active_company.is_some() {
            warn!("peek context found alongside impersonation, dropping peek");
            self.persist(&[(SessionField::ActiveCompany, None)]);
            active_company = None;
        }

        Some(self.session.insert(Session {
            current_user: user,
            current_tenant: tenant,
            impersonation,
            active_company,
        }))
    }

    /// Flip the theme and persist it. Works signed in or out.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        let raw = Self::encode(&self.theme);
        self.persist(&[(SessionField::Theme, raw)]);
        self.theme
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tenant update family
    // ─────────────────────────────────────────────────────────────────────────

    pub fn update_tenant_branding(&mut self, branding: VisualConfig) {
        self.with_tenant("update_tenant_branding", |tenant| {
            tenant.branding = branding;
        });
    }

    pub fn update_tenant_modules(&mut self, modules: ModuleConfig) {
        self.with_tenant("update_tenant_modules", |tenant| {
            tenant.modules = modules;
        });
    }

    pub fn upsert_firm_user(&mut self, user: User) {
        self.with_tenant("upsert_firm_user", |tenant| {
            tenant.upsert_user(user);
        });
    }

    pub fn remove_firm_user(&mut self, id: UserId) {
        self.with_tenant("remove_firm_user", |tenant| {
            tenant.remove_user(id);
        });
    }

    pub fn upsert_company(&mut self, company: Company) {
        self.with_tenant("upsert_company", |tenant| {
            tenant.upsert_company(company);
        });
    }

    pub fn update_company_emitter(&mut self, company_id: CompanyId, emitter: EmitterConfig) {
        self.with_tenant("update_company_emitter", |tenant| {
            match tenant.company_mut(company_id) {
                Some(company) => company.emitter = emitter,
                None => warn!(%company_id, "emitter update for unknown company ignored"),
            }
        });
    }

    pub fn upsert_company_user(&mut self, company_id: CompanyId, user: User) {
        self.with_tenant("upsert_company_user", |tenant| {
            match tenant.company_mut(company_id) {
                Some(company) => company.upsert_user(user),
                None => warn!(%company_id, "roster update for unknown company ignored"),
            }
        });
    }

    /// Read-modify-write the current tenant and persist it.
    ///
    /// No-op without an authenticated session, matching the tolerant failure
    /// style of the rest of the core.
    fn with_tenant(&mut self, op: &'static str, f: impl FnOnce(&mut Tenant)) {
        let Some(session) = self.session.as_mut() else {
            warn!(op, "tenant update ignored without an authenticated session");
            return;
        };
        f(&mut session.current_tenant);
        let raw = Self::encode(&session.current_tenant);
        self.persist(&[(SessionField::CurrentTenant, raw)]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence plumbing
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn encode<T: Serialize>(value: &T) -> Option<String> {
        match serde_json::to_string(value) {
            Ok(raw) => Some(raw),
            Err(err) => {
                error!(%err, "failed to serialize session field");
                None
            }
        }
    }

    /// Mirror a batch to durable storage.
    ///
    /// Store failures are logged, not propagated: in-memory state stays
    /// ahead and the loss surfaces on the next restore at worst.
    pub(crate) fn persist(&self, batch: &[(SessionField, Option<String>)]) {
        if let Err(err) = self.store.apply(batch) {
            error!(%err, "session persist failed");
        }
    }

    /// Drop impersonation/peek keys that survived a partial wipe. The theme
    /// is device state and stays.
    fn discard_orphaned_child_state(&self) {
        let stale: Vec<_> = [
            SessionField::Impersonation,
            SessionField::OriginalUser,
            SessionField::ActiveCompany,
        ]
        .into_iter()
        .filter(|field| matches!(self.store.get(*field), Ok(Some(_))))
        .map(|field| (field, None))
        .collect();
        if !stale.is_empty() {
            warn!("discarding child session state without a session root");
            self.persist(&stale);
        }
    }

    pub(crate) fn read_field<T: DeserializeOwned>(&self, field: SessionField) -> Restored<T> {
        let raw = match self.store.get(field) {
            Ok(raw) => raw,
            Err(err) => {
                error!(%field, %err, "session store read failed");
                return Restored::Absent;
            }
        };
        match raw {
            None => Restored::Absent,
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Restored::Present(value),
                Err(err) => {
                    warn!(%field, %err, "corrupt persisted session field");
                    Restored::Corrupt
                }
            },
        }
    }
}

fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => local.to_string(),
    }
}
