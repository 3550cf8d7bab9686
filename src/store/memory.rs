//! In-memory collection
//!
//! Non-durable; contents are lost when the process exits. Used when no data
//! directory is configured and throughout the tests.

use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::object_id::ObjectId;

use super::documents::DocumentSet;
use super::errors::{StoreError, StoreResult};
use super::{DeleteOutcome, Document, DocumentCollection, UpdateOutcome};

pub struct MemoryCollection {
    name: String,
    docs: RwLock<DocumentSet>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(DocumentSet::new()),
        }
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, id: &ObjectId) -> StoreResult<Option<Document>> {
        let docs = self.docs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(docs.get(id).cloned())
    }

    async fn find(&self, skip: usize, limit: usize) -> StoreResult<Vec<Document>> {
        let docs = self.docs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(docs.page(skip, limit))
    }

    async fn insert_one(&self, fields: Map<String, Value>) -> StoreResult<ObjectId> {
        let mut docs = self.docs.write().map_err(|_| StoreError::LockPoisoned)?;
        let doc = Document::new(ObjectId::new(), fields);
        let id = doc.id;
        docs.insert(doc);
        Ok(id)
    }

    async fn update_one(&self, id: &ObjectId, set: Map<String, Value>) -> StoreResult<UpdateOutcome> {
        let mut docs = self.docs.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(docs.set_fields(id, &set))
    }

    async fn delete_one(&self, id: &ObjectId) -> StoreResult<DeleteOutcome> {
        let mut docs = self.docs.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(docs.remove(id))
    }

    async fn count(&self) -> StoreResult<usize> {
        let docs = self.docs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(docs.len())
    }
}
