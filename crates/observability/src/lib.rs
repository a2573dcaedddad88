//! `contadesk-observability` — logging/tracing setup for the portal shell.

pub mod tracing;
