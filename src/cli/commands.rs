//! CLI command implementations

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;
use crate::http_server::HttpServer;
use crate::store::{open_collection, StoreConfig};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments, install logging and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging(&cli.log_level);
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config, data_dir } => init(&config, data_dir),
        Command::Serve {
            config,
            port,
            data_dir,
        } => serve(config.as_deref(), port, data_dir),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Write a default configuration file.
///
/// Refuses to overwrite an existing file.
pub fn init(config_path: &Path, data_dir: Option<PathBuf>) -> CliResult<()> {
    let config = ServiceConfig {
        store: StoreConfig {
            data_dir,
            ..Default::default()
        },
        ..Default::default()
    };
    let json = config.to_json_pretty()?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(config_path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                CliError::already_initialized(config_path.display())
            } else {
                CliError::io_error(format!(
                    "Failed to create {}: {}",
                    config_path.display(),
                    e
                ))
            }
        })?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;

    info!(path = %config_path.display(), "config written");
    Ok(())
}

/// Resolve configuration: file (or defaults) then command-line overrides
pub fn resolve_config(
    config_path: Option<&Path>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> CliResult<ServiceConfig> {
    let mut config = match config_path {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(port) = port {
        config.server.port = port;
    }
    if data_dir.is_some() {
        config.store.data_dir = data_dir;
    }

    config.validate()?;
    Ok(config)
}

/// Open the store and serve HTTP until shutdown
pub fn serve(config_path: Option<&Path>, port: Option<u16>, data_dir: Option<PathBuf>) -> CliResult<()> {
    let config = resolve_config(config_path, port, data_dir)?;

    let collection = open_collection(&config.store)?;
    info!(
        collection = collection.name(),
        durable = config.store.is_durable(),
        "store opened"
    );

    let server = HttpServer::new(config.server, collection);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}
