//! `contadesk-core` — shared domain primitives for the portal.
//!
//! Strongly-typed identifiers, the tenant-scope discriminant used as the
//! multi-tenancy partition key, and the domain error model. No infrastructure
//! concerns live here.

pub mod error;
pub mod id;
pub mod scope;

pub use error::DomainError;
pub use id::{CompanyId, TenantId, UserId};
pub use scope::TenantScope;
