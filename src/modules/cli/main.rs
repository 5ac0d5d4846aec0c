//! contactd CLI
//!
//! Command-line interface for the contact request backend.

use clap::Parser;
use contactd_cli::{Cli, Commands};
use contactd_core::ContactError;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ContactError> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    // Execute command
    match cli.command {
        Commands::Run(cmd) => {
            cmd.execute(&cli.env_file).await?;
        }
        Commands::Ping(cmd) => {
            cmd.execute(&cli.env_file).await?;
        }
    }

    Ok(())
}
