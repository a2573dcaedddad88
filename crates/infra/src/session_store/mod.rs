//! Session store abstraction and backends.

mod in_memory;
mod json_file;

pub use in_memory::InMemorySessionStore;
pub use json_file::JsonFileSessionStore;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The named fields of the persisted session row.
///
/// `Impersonation` and `OriginalUser` form a pair: the session layer always
/// writes them through one batch so a crash can never split them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionField {
    CurrentUser,
    CurrentTenant,
    Theme,
    Impersonation,
    OriginalUser,
    ActiveCompany,
}

impl SessionField {
    pub const ALL: [SessionField; 6] = [
        SessionField::CurrentUser,
        SessionField::CurrentTenant,
        SessionField::Theme,
        SessionField::Impersonation,
        SessionField::OriginalUser,
        SessionField::ActiveCompany,
    ];

    /// Canonical key used by backends.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionField::CurrentUser => "current_user",
            SessionField::CurrentTenant => "current_tenant",
            SessionField::Theme => "theme",
            SessionField::Impersonation => "impersonation",
            SessionField::OriginalUser => "original_user",
            SessionField::ActiveCompany => "active_company",
        }
    }
}

impl core::fmt::Display for SessionField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infrastructure error of the store itself.
///
/// Corrupt *values* are not an error at this layer; recovery per-field is
/// the session layer's job.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session store io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store serialization failure: {0}")]
    Serialization(String),

    #[error("session store backend failure: {0}")]
    Backend(String),
}

/// Durable key/value store holding the session row.
///
/// ## Contract
///
/// - `apply` is atomic: every write/removal in the batch lands together or
///   not at all, and is durable before the call returns.
/// - Readers in another process observe writes only on their next read;
///   cross-process invalidation is out of scope.
pub trait SessionStore: Send + Sync {
    /// Read one field. `Ok(None)` means the field is absent.
    fn get(&self, field: SessionField) -> Result<Option<String>, SessionStoreError>;

    /// Atomically write (`Some`) and remove (`None`) a batch of fields.
    fn apply(&self, batch: &[(SessionField, Option<String>)]) -> Result<(), SessionStoreError>;

    /// Remove every session field.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn get(&self, field: SessionField) -> Result<Option<String>, SessionStoreError> {
        (**self).get(field)
    }

    fn apply(&self, batch: &[(SessionField, Option<String>)]) -> Result<(), SessionStoreError> {
        (**self).apply(batch)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        (**self).clear()
    }
}
