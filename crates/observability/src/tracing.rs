//! Tracing/logging initialization.
//!
//! The session core logs rejected operations at `warn` and store failures at
//! `error`; this sets up the subscriber those events land in. The default
//! filter keeps the session crate at `debug` so impersonation fallbacks and
//! restore recoveries are visible without flooding the rest.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,contadesk_session=debug";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops), so tests can
/// call it unconditionally.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Flattened JSON events, one object per line, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::info!("subscriber is live");
    }
}
