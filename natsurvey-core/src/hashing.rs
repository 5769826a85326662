//! Row content hashing.
//!
//! A row's identity is the SHA-256 digest of its cells in column order. Each
//! cell is framed as a one-byte tag followed, for values, by the length and
//! bytes of its canonical text:
//!
//! ```text
//! missing: 0x00
//! value:   0x01 | len (u64 LE) | utf-8 bytes
//! ```
//!
//! The framing is injective, so a missing cell never collides with any text
//! (including the literal "None") and no text can fake a column boundary.

use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::models::{Cell, ParsedTable};

const MISSING_TAG: u8 = 0x00;
const VALUE_TAG: u8 = 0x01;

/// SHA-256 digest of one row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowDigest([u8; 32]);

impl RowDigest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering, as used in the report.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for RowDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowDigest({})", self.to_hex())
    }
}

impl fmt::Display for RowDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for RowDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Position of a file in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

/// One row's contribution to the cross-file index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHashEntry {
    pub file: FileId,
    /// 0-based row position within the file
    pub row: usize,
    pub hash: RowDigest,
}

/// Hashes cells in the order given.
pub fn hash_row<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> RowDigest {
    let mut hasher = Sha256::new();
    for cell in cells {
        match cell.canonical_text() {
            None => hasher.update([MISSING_TAG]),
            Some(text) => {
                hasher.update([VALUE_TAG]);
                hasher.update((text.len() as u64).to_le_bytes());
                hasher.update(text.as_bytes());
            }
        }
    }
    RowDigest(hasher.finalize().into())
}

/// Hashes every row of `table`.
///
/// Only digests and positions are returned; no cell data is retained.
pub fn hash_table(file: FileId, table: &ParsedTable) -> Vec<RowHashEntry> {
    (0..table.row_count())
        .map(|row| RowHashEntry {
            file,
            row,
            hash: hash_row(table.row(row)),
        })
        .collect()
}
