//! CLI module for items-api
//!
//! Provides command-line interface for:
//! - init: Write a default configuration file
//! - serve: Open the store and run the HTTP server

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, resolve_config, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
