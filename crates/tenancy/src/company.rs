//! Client company record.

use serde::{Deserialize, Serialize};

use contadesk_auth::User;
use contadesk_core::{CompanyId, TenantId, UserId};

use crate::config::EmitterConfig;

/// Company lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    #[default]
    Active,
    Suspended,
}

/// A client organization serviced by exactly one firm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    /// The issuing firm. Immutable after creation.
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub status: CompanyStatus,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub emitter: EmitterConfig,
}

impl Company {
    pub fn new(tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self {
            id: CompanyId::new(),
            tenant_id,
            name: name.into(),
            status: CompanyStatus::Active,
            users: Vec::new(),
            emitter: EmitterConfig::default(),
        }
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Insert or replace a roster entry, matched by user id.
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
