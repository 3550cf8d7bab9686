//! Document store configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where items are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data directory for the durable collection log. In-memory when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Database name (default: "test-database")
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection name (default: "test-collection")
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_database() -> String {
    "test-database".to_string()
}

fn default_collection() -> String {
    "test-collection".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database: default_database(),
            collection: default_collection(),
        }
    }
}

impl StoreConfig {
    /// Durable store rooted at `data_dir`
    pub fn on_disk(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Default::default()
        }
    }

    pub fn is_durable(&self) -> bool {
        self.data_dir.is_some()
    }
}
