//! Resumable reading position: the persistence port and its binary record.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::{fmt, str};

use heapless::Vec as RecordBuf;

use crate::{document::Document, pacing::div_round};

/// Single fixed key the reader position is stored under.
pub const PROGRESS_KEY: &str = "rsvp_progress";

const PROGRESS_MAGIC: u32 = 0x3150_5352; // "RSP1"
const PROGRESS_VERSION: u8 = 1;
const HEADER_LEN: usize = 18;
const CHECKSUM_LEN: usize = 4;
/// Longest identity the one-byte length field can describe.
pub const MAX_IDENTITY_LEN: usize = u8::MAX as usize;
pub const PROGRESS_RECORD_MAX_LEN: usize = HEADER_LEN + MAX_IDENTITY_LEN + CHECKSUM_LEN;

pub type ProgressRecord = RecordBuf<u8, PROGRESS_RECORD_MAX_LEN>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SavedProgress {
    pub document_identity: String,
    pub cursor_index: usize,
    /// Host wall-clock milliseconds at the time of the write.
    pub saved_at_ms: u64,
}

/// Position offered back to the caller after a matching read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResumeOffer {
    pub cursor_index: usize,
    pub percent_complete: u8,
}

impl ResumeOffer {
    /// Only offered when the identity matches and the position is strictly inside the document.
    pub fn from_saved(saved: &SavedProgress, document: &Document) -> Option<Self> {
        if saved.document_identity != document.identity() {
            return None;
        }
        if saved.cursor_index == 0 || saved.cursor_index >= document.len() {
            return None;
        }

        let percent_complete =
            div_round(saved.cursor_index as u64 * 100, document.len() as u64) as u8;
        Some(Self {
            cursor_index: saved.cursor_index,
            percent_complete,
        })
    }
}

/// Abstract key-value backend for reading progress.
pub trait ProgressStore {
    type Error: fmt::Debug;

    fn read(&mut self, key: &str) -> Result<Option<SavedProgress>, Self::Error>;
    fn write(&mut self, key: &str, progress: &SavedProgress) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressCodecError {
    TooShort,
    BadMagic,
    UnsupportedVersion(u8),
    Corrupted,
    IdentityTooLong,
}

impl fmt::Display for ProgressCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => f.write_str("progress record truncated"),
            Self::BadMagic => f.write_str("not a progress record"),
            Self::UnsupportedVersion(version) => {
                write!(f, "unsupported progress record version {version}")
            }
            Self::Corrupted => f.write_str("progress record checksum mismatch"),
            Self::IdentityTooLong => write!(
                f,
                "document identity longer than {MAX_IDENTITY_LEN} bytes"
            ),
        }
    }
}

/// Layout: magic u32, version u8, identity length u8, cursor u32, saved-at u64,
/// identity bytes, FNV-1a checksum u32 over everything before it. Little-endian.
pub fn encode(progress: &SavedProgress) -> Result<ProgressRecord, ProgressCodecError> {
    let identity = progress.document_identity.as_bytes();
    if identity.len() > MAX_IDENTITY_LEN {
        return Err(ProgressCodecError::IdentityTooLong);
    }

    let cursor = u32::try_from(progress.cursor_index).unwrap_or(u32::MAX);
    let mut buf = ProgressRecord::new();
    // Capacity covers the largest identity, so these cannot fail.
    let _ = buf.extend_from_slice(&PROGRESS_MAGIC.to_le_bytes());
    let _ = buf.push(PROGRESS_VERSION);
    let _ = buf.push(identity.len() as u8);
    let _ = buf.extend_from_slice(&cursor.to_le_bytes());
    let _ = buf.extend_from_slice(&progress.saved_at_ms.to_le_bytes());
    let _ = buf.extend_from_slice(identity);
    let checksum = checksum32(&buf);
    let _ = buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<SavedProgress, ProgressCodecError> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(ProgressCodecError::TooShort);
    }

    let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if magic != PROGRESS_MAGIC {
        return Err(ProgressCodecError::BadMagic);
    }

    let version = bytes[4];
    if version != PROGRESS_VERSION {
        return Err(ProgressCodecError::UnsupportedVersion(version));
    }

    let identity_len = bytes[5] as usize;
    if identity_len > MAX_IDENTITY_LEN {
        return Err(ProgressCodecError::Corrupted);
    }
    let checksum_start = HEADER_LEN + identity_len;
    if bytes.len() < checksum_start + CHECKSUM_LEN {
        return Err(ProgressCodecError::TooShort);
    }

    let expected_checksum = u32::from_le_bytes([
        bytes[checksum_start],
        bytes[checksum_start + 1],
        bytes[checksum_start + 2],
        bytes[checksum_start + 3],
    ]);
    if checksum32(&bytes[..checksum_start]) != expected_checksum {
        return Err(ProgressCodecError::Corrupted);
    }

    let cursor = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
    let mut saved_at = [0u8; 8];
    saved_at.copy_from_slice(&bytes[10..18]);
    let identity = str::from_utf8(&bytes[HEADER_LEN..checksum_start])
        .map_err(|_| ProgressCodecError::Corrupted)?;

    Ok(SavedProgress {
        document_identity: String::from(identity),
        cursor_index: cursor as usize,
        saved_at_ms: u64::from_le_bytes(saved_at),
    })
}

fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemoryStoreError {
    Codec(ProgressCodecError),
    /// Simulated backend refusal, e.g. quota exhausted.
    Rejected,
}

/// Byte-record store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: BTreeMap<String, Vec<u8>>,
    pub reject_writes: bool,
    pub writes: u32,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_saved(key: &str, progress: &SavedProgress) -> Result<Self, MemoryStoreError> {
        let mut store = Self::new();
        store.write(key, progress)?;
        store.writes = 0;
        Ok(store)
    }

    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.records.get(key).map(Vec::as_slice)
    }

    pub fn insert_raw(&mut self, key: &str, bytes: &[u8]) {
        self.records.insert(String::from(key), bytes.to_vec());
    }
}

impl ProgressStore for MemoryProgressStore {
    type Error = MemoryStoreError;

    fn read(&mut self, key: &str) -> Result<Option<SavedProgress>, Self::Error> {
        match self.records.get(key) {
            None => Ok(None),
            Some(bytes) => decode(bytes).map(Some).map_err(MemoryStoreError::Codec),
        }
    }

    fn write(&mut self, key: &str, progress: &SavedProgress) -> Result<(), Self::Error> {
        if self.reject_writes {
            return Err(MemoryStoreError::Rejected);
        }

        let record = encode(progress).map_err(MemoryStoreError::Codec)?;
        self.records.insert(String::from(key), record.to_vec());
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }
}
