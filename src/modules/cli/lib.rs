//! contactd CLI
//!
//! This crate provides the command-line interface for contactd including:
//! - run: Start the server
//! - ping: Check that the configured storage is reachable

pub mod commands;

pub use commands::{Cli, Commands};
