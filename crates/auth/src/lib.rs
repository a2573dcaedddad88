//! `contadesk-auth` — roles, capabilities and the user identity record.
//!
//! This crate is the single place where a role is compared to anything.
//! Business modules ask [`has_capability`] and never match on [`Role`]
//! directly.

pub mod capability;
pub mod roles;
pub mod user;

pub use capability::{has_capability, Capability};
pub use roles::Role;
pub use user::User;
