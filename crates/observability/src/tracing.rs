//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize JSON logging, filtered via `RUST_LOG` (default `info`).
///
/// Uses `try_init` so tests and embedders that already installed a
/// subscriber don't panic.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
