//! Document identifiers
//!
//! An [`ObjectId`] is the 12-byte identifier the document store assigns to
//! every document on insert:
//!
//! ```text
//! +-----------------+------------------------+-----------------+
//! | seconds (4, BE) | process-unique (5)     | counter (3, BE) |
//! +-----------------+------------------------+-----------------+
//! ```
//!
//! Externally an id is always the 24-character lowercase hex rendering of
//! those bytes. `parse` is the only way an external string becomes an id.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::de::{self, Deserializer, Visitor};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Raw identifier length in bytes
pub const OBJECT_ID_LEN: usize = 12;

/// External (hex) identifier length in characters
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Errors produced when an external string is not a valid identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    #[error("invalid id length: expected {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid id character {character:?} at position {index}")]
    InvalidCharacter { character: char, index: usize },
}

/// Result type for identifier parsing
pub type ObjectIdResult<T> = Result<T, ObjectIdError>;

/// A 12-byte document identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Generate a fresh identifier.
    ///
    /// Ids generated by one process are strictly increasing within a second,
    /// and the counter keeps them unique across seconds until it wraps.
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let counter = next_counter();

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Build an identifier from its raw bytes
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of this identifier
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Parse an external identifier.
    ///
    /// Accepts exactly 24 hex digits (either case). Formatting always
    /// produces lowercase, so `parse(&id.to_string()) == Ok(id)`.
    pub fn parse(external: &str) -> ObjectIdResult<Self> {
        let char_count = external.chars().count();
        if char_count != OBJECT_ID_HEX_LEN || external.len() != OBJECT_ID_HEX_LEN {
            return Err(ObjectIdError::InvalidLength {
                expected: OBJECT_ID_HEX_LEN,
                actual: char_count,
            });
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        let digits = external.as_bytes();
        for (i, byte) in bytes.iter_mut().enumerate() {
            let hi = hex_value(digits[2 * i], 2 * i)?;
            let lo = hex_value(digits[2 * i + 1], 2 * i + 1)?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// Seconds component as a UTC timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        let mut secs = [0u8; 4];
        secs.copy_from_slice(&self.0[0..4]);
        let secs = u32::from_be_bytes(secs) as i64;
        Utc.timestamp_opt(secs, 0)
            .single()
            .unwrap_or_default()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_value(digit: u8, index: usize) -> ObjectIdResult<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(ObjectIdError::InvalidCharacter {
            character: other as char,
            index,
        }),
    }
}

fn process_unique() -> &'static [u8; 5] {
    static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS_UNIQUE.get_or_init(|| rand::thread_rng().gen())
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter =
        COUNTER.get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..=COUNTER_MASK)));
    counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(\"{}\")", self)
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectIdVisitor;

        impl<'de> Visitor<'de> for ObjectIdVisitor {
            type Value = ObjectId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 24-character hex object id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ObjectId, E> {
                ObjectId::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ObjectIdVisitor)
    }
}
