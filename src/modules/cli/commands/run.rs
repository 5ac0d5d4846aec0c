//! Run command implementation

use clap::Args;
use contactd_core::ContactError;
use contactd_runtime::Runtime;

use super::load_config;

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl RunCommand {
    /// Execute the run command
    pub async fn execute(&self, env_file: &str) -> Result<(), ContactError> {
        let config = load_config(env_file)?;

        // Storage connects in the background once the server starts
        let runtime = Runtime::with_port_override(config, self.port);
        runtime.run().await?;

        Ok(())
    }
}
