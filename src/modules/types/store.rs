//! Storage backend type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// MongoDB document database
    Mongodb,
    /// Process-local store, lost on exit
    Memory,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Mongodb => write!(f, "mongodb"),
            StoreKind::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" | "mongodb+srv" => Ok(StoreKind::Mongodb),
            "memory" | "mem" => Ok(StoreKind::Memory),
            _ => Err(format!("Unknown store type: {}", s)),
        }
    }
}

impl StoreKind {
    /// Detect the backend from a connection URL scheme (`mongodb://`, `memory://`)
    pub fn from_url(url: &str) -> Result<Self, String> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| "Connection URL has no scheme".to_string())?;
        scheme.parse()
    }

    /// Returns true if records survive a process restart
    pub fn is_persistent(&self) -> bool {
        matches!(self, StoreKind::Mongodb)
    }
}
