//! Environment configuration loading

use contactd_core::{ContactError, PoolConfig, ServerConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Port to listen on
pub const PORT_VAR: &str = "PORT";
/// Storage connection URL
pub const DB_URL_VAR: &str = "DB_URL";
/// Maximum storage pool size
pub const DB_POOL_MAX_VAR: &str = "DB_POOL_MAX";
/// Minimum storage pool size
pub const DB_POOL_MIN_VAR: &str = "DB_POOL_MIN";

/// Reads [`ServerConfig`] from the environment
pub struct EnvLoader {
    /// Env file loaded before reading variables, if any
    env_file: Option<PathBuf>,
}

impl EnvLoader {
    /// Loader that reads `./.env` when present
    pub fn new() -> Self {
        Self {
            env_file: Some(PathBuf::from(".env")),
        }
    }

    /// Loader that reads the given env file when present
    pub fn with_file(path: impl AsRef<Path>) -> Self {
        Self {
            env_file: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Loader that only reads the process environment
    pub fn without_file() -> Self {
        Self { env_file: None }
    }

    /// Load the env file (variables already set win) and read the configuration
    pub fn load(&self) -> Result<ServerConfig, ContactError> {
        if let Some(path) = &self.env_file {
            match dotenvy::from_path(path) {
                Ok(()) => debug!("Loaded environment from {}", path.display()),
                Err(e) if e.not_found() => {
                    debug!("No env file at {}, using process environment", path.display())
                }
                Err(e) => {
                    return Err(ContactError::Config(format!(
                        "Failed to read env file '{}': {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<ServerConfig, ContactError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = get(PORT_VAR).map(|v| parse_number(PORT_VAR, &v)).transpose()?;
        let max_connections = get(DB_POOL_MAX_VAR)
            .map(|v| parse_number(DB_POOL_MAX_VAR, &v))
            .transpose()?;
        let min_connections = get(DB_POOL_MIN_VAR)
            .map(|v| parse_number(DB_POOL_MIN_VAR, &v))
            .transpose()?;

        let pool = if max_connections.is_some() || min_connections.is_some() {
            Some(PoolConfig {
                max_connections,
                min_connections,
                ..PoolConfig::default()
            })
        } else {
            None
        };

        Ok(ServerConfig {
            port,
            db_url: get(DB_URL_VAR).map(|v| v.trim().to_string()),
            pool,
        })
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ContactError> {
    value.trim().parse().map_err(|_| {
        ContactError::Config(format!("{} must be a number, got '{}'", name, value))
    })
}
