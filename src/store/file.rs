//! File-backed collection
//!
//! The collection lives in memory and is rebuilt at open by replaying an
//! append-only log at `<data_dir>/<database>/<collection>.log`.
//!
//! - Every mutation is appended and fsynced before it is applied
//! - Only effective mutations are logged
//! - Any damaged record aborts open; nothing is skipped or repaired
//! - A failed append is truncated away; if that fails too, the log refuses
//!   further writes until reopened
//!
//! Appends run on tokio's blocking pool. Readers only take the document
//! lock, which writers hold just long enough to apply a logged mutation.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::object_id::ObjectId;

use super::documents::DocumentSet;
use super::errors::{StoreError, StoreResult};
use super::record::{LogOp, LogRecord};
use super::{DeleteOutcome, Document, DocumentCollection, UpdateOutcome};

/// Append handle; `offset` is the end of the last acknowledged record
struct LogWriter {
    file: File,
    offset: u64,
    failed: bool,
}

impl LogWriter {
    fn append(&mut self, record: &LogRecord, path: &Path) -> StoreResult<()> {
        if self.failed {
            return Err(StoreError::LogUnwritable {
                path: path.display().to_string(),
            });
        }
        let bytes = record.encode()?;

        let len = self
            .file
            .metadata()
            .map_err(|e| StoreError::io(format!("Failed to stat {}", path.display()), e))?
            .len();
        if len < self.offset {
            self.failed = true;
            error!(
                path = %path.display(),
                expected = self.offset,
                actual = len,
                "log shorter than acknowledged records"
            );
            return Err(StoreError::LogUnwritable {
                path: path.display().to_string(),
            });
        }
        if len > self.offset {
            warn!(
                path = %path.display(),
                expected = self.offset,
                actual = len,
                "unacknowledged bytes at log tail, truncating"
            );
            self.truncate_tail(path)?;
        }

        let written = self
            .file
            .write_all(&bytes)
            .and_then(|_| self.file.sync_data());
        if let Err(e) = written {
            self.truncate_tail(path)?;
            return Err(StoreError::io(
                format!("Failed to append to {}", path.display()),
                e,
            ));
        }

        self.offset += bytes.len() as u64;
        Ok(())
    }

    /// Cut the log back to the last acknowledged record
    fn truncate_tail(&mut self, path: &Path) -> StoreResult<()> {
        let result = self
            .file
            .set_len(self.offset)
            .and_then(|_| self.file.sync_data());
        if let Err(e) = result {
            self.failed = true;
            error!(path = %path.display(), offset = self.offset, error = %e, "log rollback failed");
            return Err(StoreError::io(
                format!("Failed to roll back {}", path.display()),
                e,
            ));
        }
        Ok(())
    }
}

struct Shared {
    log: Mutex<LogWriter>,
    docs: RwLock<DocumentSet>,
}

pub struct FileCollection {
    name: String,
    path: PathBuf,
    shared: Arc<Shared>,
}

impl FileCollection {
    /// Open (creating if needed) the collection log and replay it.
    pub fn open(data_dir: &Path, database: &str, collection: &str) -> StoreResult<Self> {
        let db_dir = data_dir.join(database);
        fs::create_dir_all(&db_dir).map_err(|e| {
            StoreError::io(format!("Failed to create {}", db_dir.display()), e)
        })?;

        let path = db_dir.join(format!("{}.log", collection));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(format!("Failed to open {}", path.display()), e))?;

        let (docs, offset) = Self::replay(&path)?;
        info!(
            path = %path.display(),
            documents = docs.len(),
            bytes = offset,
            "collection log replayed"
        );

        Ok(Self {
            name: collection.to_string(),
            path,
            shared: Arc::new(Shared {
                log: Mutex::new(LogWriter {
                    file,
                    offset,
                    failed: false,
                }),
                docs: RwLock::new(docs),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(path: &Path) -> StoreResult<(DocumentSet, u64)> {
        let file = File::open(path)
            .map_err(|e| StoreError::io(format!("Failed to open {}", path.display()), e))?;
        let mut reader = BufReader::new(file);
        let mut docs = DocumentSet::new();
        let mut offset = 0u64;

        while let Some((record, consumed)) = LogRecord::read_from(&mut reader, offset)? {
            let applied = match record.op {
                LogOp::Insert => docs.insert(Document::new(record.id, record.body)),
                LogOp::Update => docs.set_fields(&record.id, &record.body).matched,
                LogOp::Delete => docs.remove(&record.id).deleted,
            };
            if !applied {
                return Err(StoreError::corrupted(
                    offset,
                    format!("{:?} record does not apply to document {}", record.op, record.id),
                ));
            }
            offset += consumed;
        }

        Ok((docs, offset))
    }

    /// Run a mutation on the blocking pool with the log held. Holding the
    /// log for the whole closure keeps log order equal to apply order.
    async fn mutate<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut LogWriter, &RwLock<DocumentSet>, &Path) -> StoreResult<T> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let mut log = shared.log.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&mut *log, &shared.docs, path.as_path())
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }

    fn docs(&self) -> StoreResult<RwLockReadGuard<'_, DocumentSet>> {
        self.shared.docs.read().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait]
impl DocumentCollection for FileCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, id: &ObjectId) -> StoreResult<Option<Document>> {
        Ok(self.docs()?.get(id).cloned())
    }

    async fn find(&self, skip: usize, limit: usize) -> StoreResult<Vec<Document>> {
        Ok(self.docs()?.page(skip, limit))
    }

    async fn insert_one(&self, fields: Map<String, Value>) -> StoreResult<ObjectId> {
        let doc = Document::new(ObjectId::new(), fields);
        let id = doc.id;

        let offset = self
            .mutate(move |log, docs, path| {
                log.append(&LogRecord::insert(doc.id, doc.fields.clone()), path)?;
                docs.write().map_err(|_| StoreError::LockPoisoned)?.insert(doc);
                Ok(log.offset)
            })
            .await?;
        debug!(collection = %self.name, %id, offset, "document inserted");
        Ok(id)
    }

    async fn update_one(&self, id: &ObjectId, set: Map<String, Value>) -> StoreResult<UpdateOutcome> {
        let id = *id;
        self.mutate(move |log, docs, path| {
            if !docs.read().map_err(|_| StoreError::LockPoisoned)?.contains(&id) {
                return Ok(UpdateOutcome::default());
            }
            log.append(&LogRecord::update(id, set.clone()), path)?;
            let mut docs = docs.write().map_err(|_| StoreError::LockPoisoned)?;
            Ok(docs.set_fields(&id, &set))
        })
        .await
    }

    async fn delete_one(&self, id: &ObjectId) -> StoreResult<DeleteOutcome> {
        let id = *id;
        self.mutate(move |log, docs, path| {
            if !docs.read().map_err(|_| StoreError::LockPoisoned)?.contains(&id) {
                return Ok(DeleteOutcome::default());
            }
            log.append(&LogRecord::delete(id), path)?;
            let mut docs = docs.write().map_err(|_| StoreError::LockPoisoned)?;
            Ok(docs.remove(&id))
        })
        .await
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.docs()?.len())
    }
}
