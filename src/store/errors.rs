//! Document store errors
//!
//! Error codes:
//! - ITEMS_STORE_IO_ERROR
//! - ITEMS_STORE_CORRUPTION (collection cannot be opened)
//! - ITEMS_STORE_SERIALIZATION
//! - ITEMS_STORE_LOCK_POISONED
//! - ITEMS_STORE_RECORD_TOO_LARGE
//! - ITEMS_STORE_LOG_UNWRITABLE (a failed append could not be rolled back)
//! - ITEMS_STORE_TASK_FAILED

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Disk I/O failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Log record failed checksum or structural checks
    #[error("Data corruption at offset {offset}: {reason}")]
    Corrupted { offset: u64, reason: String },

    /// Document body could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Collection lock poisoned")]
    LockPoisoned,

    #[error("Record of {len} bytes exceeds the {max} byte limit")]
    RecordTooLarge { len: usize, max: usize },

    /// The log tail is in an unknown state; further appends are refused
    #[error("Collection log {path} is unwritable until reopened")]
    LogUnwritable { path: String },

    /// A blocking storage task panicked or was cancelled
    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

impl StoreError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn corrupted(offset: u64, reason: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "ITEMS_STORE_IO_ERROR",
            Self::Corrupted { .. } => "ITEMS_STORE_CORRUPTION",
            Self::Serialization(_) => "ITEMS_STORE_SERIALIZATION",
            Self::LockPoisoned => "ITEMS_STORE_LOCK_POISONED",
            Self::RecordTooLarge { .. } => "ITEMS_STORE_RECORD_TOO_LARGE",
            Self::LogUnwritable { .. } => "ITEMS_STORE_LOG_UNWRITABLE",
            Self::TaskFailed(_) => "ITEMS_STORE_TASK_FAILED",
        }
    }
}
