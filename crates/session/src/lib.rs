//! `contadesk-session` — identity, tenant-scoping and impersonation core.
//!
//! The [`SessionManager`] is an explicit service object: the app shell
//! constructs exactly one and hands a reference to every business module.
//! Business modules consume two contracts and nothing else:
//!
//! - [`SessionManager::effective_context`] — which organization is in force
//!   right now (the partition key for every business collection);
//! - [`SessionManager::current_role`] + [`has_capability`] — whether the
//!   acting role may use a capability.
//!
//! Every mutation persists to the durable [`contadesk_infra::SessionStore`]
//! before returning, so a restart reconstructs the same effective state.

pub mod error;
pub mod impersonation;
pub mod resolver;
pub mod session;
pub mod switchboard;

pub use error::AuthError;
pub use impersonation::{ImpersonationRecord, ImpersonationState, Personified};
pub use resolver::{resolve_effective_context, EffectiveContext, MISSING_COMPANY_NAME};
pub use session::{LoginPolicy, Session, SessionManager, Theme};

pub use contadesk_auth::{has_capability, Capability, Role};
