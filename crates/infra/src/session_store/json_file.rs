use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

use super::{SessionField, SessionStore, SessionStoreError};

/// File-backed session store: one JSON object per device.
///
/// Writes go through a temp file followed by a rename, so the row on disk is
/// always either the previous batch or the new one, never a torn write. An
/// unreadable or non-JSON file is treated as an empty row (the session layer
/// handles per-field corruption on restore).
#[derive(Debug)]
pub struct JsonFileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "session file unreadable, treating as empty");
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(fields) => fields,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "session file corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn persist(&self, fields: &BTreeMap<String, String>) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_string_pretty(fields)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for JsonFileSessionStore {
    fn get(&self, field: SessionField) -> Result<Option<String>, SessionStoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionStoreError::Backend("lock poisoned".to_string()))?;
        Ok(self.load().get(field.as_str()).cloned())
    }

    fn apply(&self, batch: &[(SessionField, Option<String>)]) -> Result<(), SessionStoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionStoreError::Backend("lock poisoned".to_string()))?;
        let mut fields = self.load();
        for (field, value) in batch {
            match value {
                Some(v) => {
                    fields.insert(field.as_str().to_string(), v.clone());
                }
                None => {
                    fields.remove(field.as_str());
                }
            }
        }
        self.persist(&fields)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionStoreError::Backend("lock poisoned".to_string()))?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> JsonFileSessionStore {
        let path = std::env::temp_dir().join(format!("contadesk-session-{}.json", Uuid::now_v7()));
        JsonFileSessionStore::new(path)
    }

    #[test]
    fn batch_survives_reopening_the_file() {
        let store = temp_store();
        store
            .apply(&[
                (SessionField::CurrentUser, Some("u".to_string())),
                (SessionField::Theme, Some("dark".to_string())),
            ])
            .unwrap();

        // A second handle on the same path sees the committed row.
        let reopened = JsonFileSessionStore::new(store.path().to_path_buf());
        assert_eq!(reopened.get(SessionField::CurrentUser).unwrap().as_deref(), Some("u"));
        assert_eq!(reopened.get(SessionField::Theme).unwrap().as_deref(), Some("dark"));

        store.clear().unwrap();
        assert_eq!(reopened.get(SessionField::Theme).unwrap(), None);
    }

    #[test]
    fn garbage_file_reads_as_empty_and_is_recoverable() {
        let store = temp_store();
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.get(SessionField::CurrentUser).unwrap(), None);

        // Writing after corruption replaces the file wholesale.
        store
            .apply(&[(SessionField::Theme, Some("light".to_string()))])
            .unwrap();
        assert_eq!(store.get(SessionField::Theme).unwrap().as_deref(), Some("light"));

        store.clear().unwrap();
    }

    #[test]
    fn clear_on_missing_file_is_idempotent() {
        let store = temp_store();
        store.clear().unwrap();
        store.clear().unwrap();
    }
}
