//! Session error model.
//!
//! Deliberately small. Unauthorized impersonation or context-switch attempts
//! are warn-logged no-ops, not errors, and corrupt persisted state is
//! recovered during restore. The only failure a caller ever sees is a bad
//! credential pair on the login form.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong email/secret pair. Surfaced to the login form; retry is manual.
    #[error("invalid credentials")]
    InvalidCredentials,
}
