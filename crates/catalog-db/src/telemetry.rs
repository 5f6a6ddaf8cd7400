//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,catalog=debug,sqlx=warn";

/// Installs a global fmt subscriber filtered by `RUST_LOG`.
///
/// ## Log Levels
/// - ERROR: Store failures
/// - WARN: CAS conflicts, exhausted retries
/// - INFO: Pool and migration lifecycle
/// - DEBUG: Every stock operation and repository call
///
/// Calling it again once a subscriber is installed is a no-op, so test
/// harnesses may call it from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
