//! Cross-file duplicate index.
//!
//! The index keeps only digests and positions, never cell data, so its size
//! grows with the total row count but not with row width.

use std::collections::{HashMap, HashSet};

use crate::hashing::{FileId, RowDigest, RowHashEntry};

/// Position of one row in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowLocation {
    pub file: FileId,
    /// 0-based row position within the file
    pub row: usize,
}

/// Rows sharing one content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub hash: RowDigest,
    /// Sorted by (file order, row)
    pub locations: Vec<RowLocation>,
}

impl DuplicateGroup {
    /// Number of distinct files referenced.
    pub fn file_count(&self) -> usize {
        self.locations
            .iter()
            .map(|l| l.file)
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Accumulates row digests across files.
#[derive(Debug, Clone, Default)]
pub struct CrossFileIndex {
    groups: HashMap<RowDigest, Vec<RowLocation>>,
    entries: usize,
}

impl CrossFileIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the entries of one file.
    pub fn record(&mut self, entries: impl IntoIterator<Item = RowHashEntry>) {
        for entry in entries {
            self.groups.entry(entry.hash).or_default().push(RowLocation {
                file: entry.file,
                row: entry.row,
            });
            self.entries += 1;
        }
    }

    /// Unions `other` into this index.
    ///
    /// The result does not depend on merge order, since [`finalize`]
    /// sorts every group.
    ///
    /// [`finalize`]: CrossFileIndex::finalize
    pub fn merge(&mut self, other: CrossFileIndex) {
        self.entries += other.entries;
        for (hash, locations) in other.groups {
            self.groups.entry(hash).or_default().extend(locations);
        }
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Whether no entry has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of distinct digests.
    pub fn distinct_hashes(&self) -> usize {
        self.groups.len()
    }

    /// Computes the groups whose locations span at least two files.
    ///
    /// Groups are ordered by their first location, which makes any prefix
    /// of the result deterministic for a given input.
    pub fn finalize(self) -> Vec<DuplicateGroup> {
        let mut groups: Vec<DuplicateGroup> = self
            .groups
            .into_iter()
            .filter_map(|(hash, mut locations)| {
                locations.sort_unstable();
                locations.dedup();
                let first_file = locations.first()?.file;
                locations
                    .iter()
                    .any(|l| l.file != first_file)
                    .then_some(DuplicateGroup { hash, locations })
            })
            .collect();

        groups.sort_unstable_by(|a, b| a.locations[0].cmp(&b.locations[0]));
        groups
    }
}
