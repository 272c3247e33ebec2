//! Tracing bootstrap for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Installs a formatted `tracing` subscriber honouring `RUST_LOG`.
///
/// Falls back to `info` when no filter is set in the environment. Safe to
/// call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
