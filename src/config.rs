//! Service configuration
//!
//! A single JSON file; every field has a default so `{}` is a valid config.
//!
//! ```json
//! {
//!   "server": { "host": "0.0.0.0", "port": 8000, "cors_origins": [], "max_page_size": 1000 },
//!   "store":  { "data_dir": null, "database": "test-database", "collection": "test-collection" }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::store::StoreConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl ServiceConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ServiceConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".to_string()));
        }

        if self.server.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "server.max_page_size must be >= 1".to_string(),
            ));
        }

        validate_name("store.database", &self.store.database)?;
        validate_name("store.collection", &self.store.collection)?;

        Ok(())
    }
}

/// Database and collection names become path components
fn validate_name(key: &str, name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConfigError::Invalid(format!(
            "{} must not contain path separators: '{}'",
            key, name
        )));
    }
    Ok(())
}
