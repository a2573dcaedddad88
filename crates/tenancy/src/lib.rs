//! `contadesk-tenancy` — accounting firms and their client companies.
//!
//! Records here are plain serializable state edited through the session
//! manager's update family. Nested configuration is always-valid: absent
//! JSON deserializes to defaults, never to `Option`.

pub mod company;
pub mod config;
pub mod tenant;

pub use company::{Company, CompanyStatus};
pub use config::{EmitterConfig, EmitterEnvironment, ModuleConfig, VisualConfig};
pub use tenant::Tenant;
