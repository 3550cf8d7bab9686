//! Ordered in-memory document set
//!
//! Shared by the memory and file collections. Documents are kept in
//! insertion order; a side index maps ids to their insertion sequence.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::object_id::ObjectId;

use super::{DeleteOutcome, Document, UpdateOutcome};

#[derive(Debug, Default, Clone)]
pub struct DocumentSet {
    by_seq: BTreeMap<u64, Document>,
    seq_of: HashMap<ObjectId, u64>,
    next_seq: u64,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_seq.is_empty()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.seq_of.contains_key(id)
    }

    pub fn get(&self, id: &ObjectId) -> Option<&Document> {
        self.seq_of.get(id).and_then(|seq| self.by_seq.get(seq))
    }

    /// Documents in insertion order, skipping `skip` then taking `limit`
    pub fn page(&self, skip: usize, limit: usize) -> Vec<Document> {
        self.by_seq.values().skip(skip).take(limit).cloned().collect()
    }

    /// Append a document. Returns false (and changes nothing) if the id is
    /// already present.
    pub fn insert(&mut self, doc: Document) -> bool {
        if self.seq_of.contains_key(&doc.id) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.seq_of.insert(doc.id, seq);
        self.by_seq.insert(seq, doc);
        true
    }

    /// Overwrite the named fields of one document
    pub fn set_fields(&mut self, id: &ObjectId, set: &Map<String, Value>) -> UpdateOutcome {
        let doc = match self.seq_of.get(id).and_then(|seq| self.by_seq.get_mut(seq)) {
            Some(doc) => doc,
            None => return UpdateOutcome::default(),
        };

        let mut modified = false;
        for (field, value) in set {
            if doc.fields.get(field) != Some(value) {
                doc.fields.insert(field.clone(), value.clone());
                modified = true;
            }
        }

        UpdateOutcome {
            matched: true,
            modified,
        }
    }

    pub fn remove(&mut self, id: &ObjectId) -> DeleteOutcome {
        let deleted = match self.seq_of.remove(id) {
            Some(seq) => self.by_seq.remove(&seq).is_some(),
            None => false,
        };
        DeleteOutcome { deleted }
    }
}
