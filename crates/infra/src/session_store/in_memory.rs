use std::collections::HashMap;
use std::sync::RwLock;

use super::{SessionField, SessionStore, SessionStoreError};

/// In-memory session store.
///
/// Intended for tests/dev; "durable" only for the lifetime of the process,
/// which is enough to exercise restore paths against a shared handle.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    fields: RwLock<HashMap<SessionField, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, field: SessionField) -> Result<Option<String>, SessionStoreError> {
        let fields = self
            .fields
            .read()
            .map_err(|_| SessionStoreError::Backend("lock poisoned".to_string()))?;
        Ok(fields.get(&field).cloned())
    }

    fn apply(&self, batch: &[(SessionField, Option<String>)]) -> Result<(), SessionStoreError> {
        let mut fields = self
            .fields
            .write()
            .map_err(|_| SessionStoreError::Backend("lock poisoned".to_string()))?;
        for (field, value) in batch {
            match value {
                Some(v) => {
                    fields.insert(*field, v.clone());
                }
                None => {
                    fields.remove(field);
                }
            }
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let mut fields = self
            .fields
            .write()
            .map_err(|_| SessionStoreError::Backend("lock poisoned".to_string()))?;
        fields.clear();
        Ok(())
    }
}
