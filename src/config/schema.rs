//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a test client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// How targets without an explicit origin are addressed.
    pub target: TargetConfig,

    /// Transport behavior (timeouts, identification).
    pub transport: TransportConfig,

    /// Ephemeral server settings for in-process handlers.
    pub server: ServerConfig,
}

/// Target resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Loopback host used for handler, port and ambient targets.
    pub host: String,

    /// Environment variable supplying the ambient port.
    pub port_env: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port_env: "PORT".to_string(),
        }
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-exchange timeout in seconds, covering all redirect hops (0 = none).
    pub request_timeout_secs: u64,

    /// Value for the `user-agent` header when the request sets none.
    pub user_agent: Option<String>,
}

/// Ephemeral server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// How long to wait for a closed server to drain before aborting it.
    pub shutdown_timeout_ms: u64,

    /// Wrap in-process handlers in an HTTP trace layer.
    pub trace_requests: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: 1000,
            trace_requests: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [transport]
            request_timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.transport.request_timeout_secs, 5);
        assert_eq!(config.target.host, "127.0.0.1");
        assert_eq!(config.target.port_env, "PORT");
        assert_eq!(config.server.shutdown_timeout_ms, 1000);
    }
}
