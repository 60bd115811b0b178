//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the lookup server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Per-stage timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Backend store and pool settings.
    pub store: StoreConfig,

    /// Request routing (identifier path shape).
    pub route: RouteConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent sessions (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Per-stage timeouts. Each stage's deadline is independent: a slow read
/// never shortens the handle budget.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bounds reading the request line + headers.
    pub read_ms: u64,

    /// Bounds parse + pool acquire + query.
    pub handle_ms: u64,

    /// Bounds sending the response.
    pub write_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_ms: 30_000,
            handle_ms: 30_000,
            write_ms: 30_000,
        }
    }
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    pub fn handle(&self) -> Duration {
        Duration::from_millis(self.handle_ms)
    }

    pub fn write(&self) -> Duration {
        Duration::from_millis(self.write_ms)
    }
}

/// Backend store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of pooled connections shared across sessions.
    pub pool_size: usize,

    /// Bound on waiting for a free pooled connection, within the handle
    /// budget.
    pub acquire_timeout_ms: u64,

    /// Optional TOML file seeding the bundled in-memory backend.
    pub fixture_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_size: 16,
            acquire_timeout_ms: 5_000,
            fixture_path: None,
        }
    }
}

impl StoreConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

/// Request routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Fixed path prefix in front of the numeric identifier.
    pub path_prefix: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/employee/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.read(), Duration::from_secs(30));
        assert_eq!(config.store.pool_size, 16);
        assert_eq!(config.route.path_prefix, "/employee/");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [timeouts]
            handle_ms = 250

            [store]
            pool_size = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.timeouts.handle_ms, 250);
        assert_eq!(config.timeouts.read_ms, 30_000);
        assert_eq!(config.store.pool_size, 4);
        assert_eq!(config.listener.max_connections, 10_000);
    }
}
