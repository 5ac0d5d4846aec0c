//! Server and storage configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 8080;

/// Connection pool configuration for the storage client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool (default: 10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,

    /// Minimum number of connections to maintain (default: 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,

    /// Connect timeout in seconds (default: 30)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    /// Idle connection timeout in seconds (default: 600)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: Some(10),
            min_connections: Some(1),
            connect_timeout_secs: Some(30),
            idle_timeout_secs: Some(600),
        }
    }
}

impl PoolConfig {
    /// Get max connections with default fallback
    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(10)
    }

    /// Get min connections with default fallback
    pub fn min_connections(&self) -> u32 {
        self.min_connections.unwrap_or(1)
    }

    /// Get connect timeout with default fallback
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(30))
    }

    /// Get idle timeout with default fallback
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs.unwrap_or(600))
    }
}

/// Server configuration, usually loaded from the environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on (default: 8080)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Storage connection URL (`mongodb://...` or `memory://`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_url: Option<String>,

    /// Connection pool configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolConfig>,
}

impl ServerConfig {
    /// Get the server port, defaulting to 8080
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Get the pool configuration, defaulting every unset field
    pub fn pool(&self) -> PoolConfig {
        self.pool.clone().unwrap_or_default()
    }

    /// Replace the configured port when an override is given
    pub fn with_port_override(mut self, port_override: Option<u16>) -> Self {
        if port_override.is_some() {
            self.port = port_override;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default_port() {
        let config = ServerConfig::default();
        assert_eq!(config.port(), 8080);
        assert!(config.db_url.is_none());
    }

    #[test]
    fn test_port_override() {
        let config = ServerConfig {
            port: Some(3000),
            ..Default::default()
        };
        assert_eq!(config.clone().with_port_override(None).port(), 3000);
        assert_eq!(config.with_port_override(Some(9000)).port(), 9000);
    }

    #[test]
    fn test_pool_config_default() {
        let config = ServerConfig::default().pool();
        assert_eq!(config.max_connections(), 10);
        assert_eq!(config.min_connections(), 1);
        assert_eq!(config.connect_timeout().as_secs(), 30);
        assert_eq!(config.idle_timeout().as_secs(), 600);
    }

    #[test]
    fn test_server_config_serde_skips_unset() {
        let config = ServerConfig {
            port: Some(3000),
            db_url: None,
            pool: None,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"port":3000}"#);
    }
}
