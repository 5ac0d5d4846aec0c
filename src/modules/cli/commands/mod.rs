//! CLI commands

mod ping;
mod run;

pub use ping::PingCommand;
pub use run::RunCommand;

use clap::{Parser, Subcommand};
use contactd_core::{ContactError, ServerConfig};
use contactd_parser::EnvLoader;
use tracing::info;

/// contactd - HTTP backend for contact requests
#[derive(Parser, Debug)]
#[command(name = "contactd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Dotenv file read before the process environment
    ///
    /// A missing file is not an error. This is a *global* option so it can
    /// be specified after subcommands, e.g. `contactd run --env-file prod.env`.
    #[arg(long = "env-file", global = true, default_value = ".env")]
    pub env_file: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long = "json-logs", global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the contactd server
    Run(RunCommand),

    /// Check that the configured storage is reachable
    Ping(PingCommand),
}

/// Load settings from the dotenv file and the process environment
pub(crate) fn load_config(env_file: &str) -> Result<ServerConfig, ContactError> {
    info!("Loading environment from: {}", env_file);
    EnvLoader::with_file(env_file).load()
}
