//! Ping command implementation

use clap::Args;
use contactd_core::ContactError;
use contactd_runtime::store::open_store;
use tracing::info;

use super::load_config;

/// Ping command arguments
#[derive(Args, Debug)]
pub struct PingCommand {}

impl PingCommand {
    /// Connect to the configured storage and disconnect again
    pub async fn execute(&self, env_file: &str) -> Result<(), ContactError> {
        let config = load_config(env_file)?;

        // open_store already pings a remote backend
        let store = open_store(&config).await?;
        info!("Storage is reachable ({})", store.kind());
        store.close().await
    }
}
