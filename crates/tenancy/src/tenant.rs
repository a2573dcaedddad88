//! Accounting firm record.

use serde::{Deserialize, Serialize};

use contadesk_auth::User;
use contadesk_core::{CompanyId, TenantId, UserId};

use crate::company::Company;
use crate::config::{ModuleConfig, VisualConfig};

/// An accounting firm: the tenant boundary of the portal.
///
/// Owns its firm-side user roster and the directory of client companies it
/// services. Created once per firm and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    #[serde(default)]
    pub branding: VisualConfig,
    #[serde(default)]
    pub modules: ModuleConfig,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub companies: Vec<Company>,
}

impl Tenant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TenantId::new(),
            name: name.into(),
            branding: VisualConfig::default(),
            modules: ModuleConfig::default(),
            users: Vec::new(),
            companies: Vec::new(),
        }
    }

    pub fn company(&self, id: CompanyId) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn company_mut(&mut self, id: CompanyId) -> Option<&mut Company> {
        self.companies.iter_mut().find(|c| c.id == id)
    }

    pub fn company_name(&self, id: CompanyId) -> Option<&str> {
        self.company(id).map(|c| c.name.as_str())
    }

    /// Insert or replace a client company, matched by id.
    pub fn upsert_company(&mut self, company: Company) {
        match self.companies.iter_mut().find(|c| c.id == company.id) {
            Some(existing) => *existing = company,
            None => self.companies.push(company),
        }
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Insert or replace a firm-side roster entry, matched by user id.
    pub fn upsert_user(&mut self, user: User) {
        match self.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => self.users.push(user),
        }
    }

    pub fn remove_user(&mut self, id: UserId) {
        self.users.retain(|u| u.id != id);
    }
}
