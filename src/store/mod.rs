//! # Document Store
//!
//! The collection handle the request handlers talk to. Handlers only see the
//! [`DocumentCollection`] trait; two implementations exist:
//!
//! - [`MemoryCollection`] keeps documents in process memory
//! - [`FileCollection`] additionally appends every mutation to a checksummed
//!   log and replays it on open
//!
//! Both return documents in insertion order and are safe to share between
//! in-flight requests. Nothing here retries.

mod config;
mod documents;
mod errors;
mod file;
mod memory;
mod record;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::object_id::ObjectId;

pub use config::StoreConfig;
pub use documents::DocumentSet;
pub use errors::{StoreError, StoreResult};
pub use file::FileCollection;
pub use memory::MemoryCollection;
pub use record::{compute_checksum, LogOp, LogRecord, MAX_RECORD_LEN};

/// Key the store reserves for the document id
pub const ID_FIELD: &str = "_id";

/// A stored document: its id plus every other field
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: ObjectId,
    pub fields: Map<String, Value>,
}

impl Document {
    /// The id is owned by the store; any `_id` in `fields` is dropped.
    pub fn new(id: ObjectId, mut fields: Map<String, Value>) -> Self {
        fields.remove(ID_FIELD);
        Self { id, fields }
    }
}

/// Result of `update_one`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// A document had the given id
    pub matched: bool,
    /// At least one field value changed
    pub modified: bool,
}

/// Result of `delete_one`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: bool,
}

/// A collection of documents keyed by store-assigned ids
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    async fn find_one(&self, id: &ObjectId) -> StoreResult<Option<Document>>;

    /// Insertion order, `skip` documents skipped, at most `limit` returned
    async fn find(&self, skip: usize, limit: usize) -> StoreResult<Vec<Document>>;

    /// Store a new document; the store assigns its id
    async fn insert_one(&self, fields: Map<String, Value>) -> StoreResult<ObjectId>;

    /// Overwrite the given fields of one document
    async fn update_one(&self, id: &ObjectId, set: Map<String, Value>) -> StoreResult<UpdateOutcome>;

    async fn delete_one(&self, id: &ObjectId) -> StoreResult<DeleteOutcome>;

    async fn count(&self) -> StoreResult<usize>;
}

/// Open the collection described by `config`
pub fn open_collection(config: &StoreConfig) -> StoreResult<Arc<dyn DocumentCollection>> {
    match &config.data_dir {
        Some(dir) => Ok(Arc::new(FileCollection::open(
            dir,
            &config.database,
            &config.collection,
        )?)),
        None => Ok(Arc::new(MemoryCollection::new(config.collection.clone()))),
    }
}
