//! Environment-driven configuration for the store layer.

use std::str::FromStr;
use std::time::Duration;

/// Connection/pool settings for the Postgres store.
///
/// The pool is process-wide state: it is built once at startup from this
/// config and injected into everything that needs a store handle.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// How long to wait for a pooled connection before giving up.
    pub acquire_timeout: Duration,
    /// Per-transaction bound on waiting for row/advisory locks. A timeout
    /// surfaces as a retriable concurrency conflict, never a hung request.
    pub lock_timeout: Duration,
}

impl StoreConfig {
    /// Read the store config from the environment.
    ///
    /// Returns `None` when `DATABASE_URL` is unset — callers fall back to
    /// the in-memory store in that case.
    pub fn from_env() -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        Some(Self {
            database_url,
            max_connections: env_or("STORE_MAX_CONNECTIONS", 10),
            acquire_timeout: Duration::from_millis(env_or("STORE_ACQUIRE_TIMEOUT_MS", 3_000)),
            lock_timeout: Duration::from_millis(env_or("STORE_LOCK_TIMEOUT_MS", 5_000)),
        })
    }
}

fn env_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{key}={raw} is not valid; using default {default}");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_garbage() {
        // Key intentionally unset.
        assert_eq!(env_or("ORDERDESK_TEST_UNSET_KEY", 7u32), 7);
    }
}
