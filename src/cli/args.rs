//! CLI argument definitions using clap
//!
//! Commands:
//! - items-api init --config <path> [--data-dir <dir>]
//! - items-api serve [--config <path>] [--port <port>] [--data-dir <dir>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// items-api - CRUD HTTP service over a document store
#[derive(Parser, Debug)]
#[command(name = "items-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path of the configuration file to create
        #[arg(long, default_value = "./items-api.json")]
        config: PathBuf,

        /// Persist items under this directory instead of in memory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,

        /// Override the configured data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "items-api",
            "--log-level",
            "debug",
            "serve",
            "--port",
            "9000",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Command::Serve { config, port, data_dir } => {
                assert!(config.is_none());
                assert_eq!(port, Some(9000));
                assert!(data_dir.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_init_defaults() {
        let cli = Cli::try_parse_from(["items-api", "init"]).unwrap();
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Command::Init { config, data_dir } => {
                assert_eq!(config, PathBuf::from("./items-api.json"));
                assert!(data_dir.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
