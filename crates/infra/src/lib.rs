//! `contadesk-infra` — durable storage for the session core.
//!
//! One logical row per device: a handful of named fields holding serialized
//! session state. The abstraction is deliberately dumb (string values,
//! atomic multi-field batches) so any durable key/value backend qualifies.

pub mod session_store;

pub use session_store::{
    InMemorySessionStore, JsonFileSessionStore, SessionField, SessionStore, SessionStoreError,
};
