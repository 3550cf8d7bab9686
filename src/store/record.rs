//! Collection log records
//!
//! Every mutation of a file-backed collection is one record:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, bytes that follow)
//! +------------------+
//! | Op               | (u8: 1 = insert, 2 = update, 3 = delete)
//! +------------------+
//! | Document ID      | (12 bytes)
//! +------------------+
//! | Body             | (JSON object; empty for delete)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 over op + id + body)
//! +------------------+
//! ```

use std::io::{self, Read};

use crc32fast::Hasher;
use serde_json::{Map, Value};

use crate::object_id::{ObjectId, OBJECT_ID_LEN};

use super::errors::{StoreError, StoreResult};

const LEN_FIELD: usize = 4;
const CHECKSUM_LEN: usize = 4;
const MIN_RECORD_LEN: usize = 1 + OBJECT_ID_LEN + CHECKSUM_LEN;

/// Upper bound on a single record, guards against garbage length prefixes
pub const MAX_RECORD_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogOp {
    Insert = 1,
    Update = 2,
    Delete = 3,
}

impl LogOp {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Insert),
            2 => Some(Self::Update),
            3 => Some(Self::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub op: LogOp,
    pub id: ObjectId,
    pub body: Map<String, Value>,
}

impl LogRecord {
    pub fn insert(id: ObjectId, fields: Map<String, Value>) -> Self {
        Self {
            op: LogOp::Insert,
            id,
            body: fields,
        }
    }

    pub fn update(id: ObjectId, set: Map<String, Value>) -> Self {
        Self {
            op: LogOp::Update,
            id,
            body: set,
        }
    }

    pub fn delete(id: ObjectId) -> Self {
        Self {
            op: LogOp::Delete,
            id,
            body: Map::new(),
        }
    }

    /// Serialize to the on-disk format
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        let body = match self.op {
            LogOp::Delete => Vec::new(),
            _ => serde_json::to_vec(&self.body)?,
        };

        let record_len = 1 + OBJECT_ID_LEN + body.len() + CHECKSUM_LEN;
        if record_len > MAX_RECORD_LEN {
            return Err(StoreError::RecordTooLarge {
                len: record_len,
                max: MAX_RECORD_LEN,
            });
        }

        let mut out = Vec::with_capacity(LEN_FIELD + record_len);
        out.extend_from_slice(&(record_len as u32).to_le_bytes());
        out.push(self.op as u8);
        out.extend_from_slice(&self.id.bytes());
        out.extend_from_slice(&body);

        let checksum = compute_checksum(&out[LEN_FIELD..]);
        out.extend_from_slice(&checksum.to_le_bytes());
        Ok(out)
    }

    /// Read the next record. `Ok(None)` at a clean end of input; any partial
    /// or damaged record is corruption at `offset`.
    pub fn read_from<R: Read>(reader: &mut R, offset: u64) -> StoreResult<Option<(Self, u64)>> {
        let mut len_buf = [0u8; LEN_FIELD];
        match read_full(reader, &mut len_buf) {
            Ok(0) => return Ok(None),
            Ok(n) if n < LEN_FIELD => {
                return Err(StoreError::corrupted(offset, "truncated record length"))
            }
            Ok(_) => {}
            Err(e) => return Err(StoreError::io("Failed to read collection log", e)),
        }

        let record_len = u32::from_le_bytes(len_buf) as usize;
        if !(MIN_RECORD_LEN..=MAX_RECORD_LEN).contains(&record_len) {
            return Err(StoreError::corrupted(
                offset,
                format!("invalid record length {}", record_len),
            ));
        }

        let mut data = vec![0u8; record_len];
        let n = read_full(reader, &mut data)
            .map_err(|e| StoreError::io("Failed to read collection log", e))?;
        if n < record_len {
            return Err(StoreError::corrupted(offset, "truncated record"));
        }

        let (payload, checksum) = data.split_at(record_len - CHECKSUM_LEN);
        let mut expected = [0u8; CHECKSUM_LEN];
        expected.copy_from_slice(checksum);
        if compute_checksum(payload) != u32::from_le_bytes(expected) {
            return Err(StoreError::corrupted(offset, "checksum mismatch"));
        }

        let op = LogOp::from_u8(payload[0])
            .ok_or_else(|| StoreError::corrupted(offset, format!("unknown op {}", payload[0])))?;

        let mut id = [0u8; OBJECT_ID_LEN];
        id.copy_from_slice(&payload[1..1 + OBJECT_ID_LEN]);
        let id = ObjectId::from_bytes(id);

        let body_bytes = &payload[1 + OBJECT_ID_LEN..];
        let body = match op {
            LogOp::Delete if body_bytes.is_empty() => Map::new(),
            LogOp::Delete => {
                return Err(StoreError::corrupted(offset, "delete record carries a body"))
            }
            _ => serde_json::from_slice(body_bytes).map_err(|e| {
                StoreError::corrupted(offset, format!("undecodable body: {}", e))
            })?,
        };

        let consumed = (LEN_FIELD + record_len) as u64;
        Ok(Some((Self { op, id, body }, consumed)))
    }
}

/// CRC32 (IEEE) over `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Like `read_exact`, but reports how much was read instead of failing on
/// a short read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
