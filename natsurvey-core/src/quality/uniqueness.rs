//! Uniqueness analysis for data quality assessment.
//!
//! This module counts within-file duplicates, for complete rows and for a
//! configured subset of key columns. The first occurrence of a row is never
//! counted, so a file of `n` rows has at most `n - 1` duplicates.

use std::collections::HashSet;

use crate::hashing::{RowDigest, hash_row};
use crate::models::{Column, ParsedTable};

use super::models::{DuplicateCount, KeyColumnDuplicates, percentage};

/// Counts digests that repeat an earlier digest.
pub fn count_repeated(digests: impl IntoIterator<Item = RowDigest>) -> u64 {
    let mut seen: HashSet<RowDigest> = HashSet::new();
    let mut duplicate_count: u64 = 0;
    for digest in digests {
        if !seen.insert(digest) {
            duplicate_count += 1;
        }
    }
    duplicate_count
}

/// Exact full-row duplicates, from the row digests already computed for
/// the cross-file index.
pub fn analyze_exact_duplicates(
    row_digests: impl IntoIterator<Item = RowDigest>,
    total_rows: u64,
) -> DuplicateCount {
    DuplicateCount::new(count_repeated(row_digests), total_rows)
}

/// Duplicates over the key columns actually present in `table`.
///
/// Returns `None` when none of the key columns exist; the check is then
/// skipped rather than computed over an empty key.
pub fn analyze_key_duplicates(
    table: &ParsedTable,
    key_columns: &[String],
) -> Option<KeyColumnDuplicates> {
    let present: Vec<&Column> = key_columns
        .iter()
        .filter_map(|name| table.column(name))
        .collect();

    if present.is_empty() {
        return None;
    }

    let digests = (0..table.row_count())
        .map(|row| hash_row(present.iter().filter_map(|column| column.cells.get(row))));
    let count = count_repeated(digests);
    let total = table.row_count() as u64;

    Some(KeyColumnDuplicates {
        columns: present.iter().map(|c| c.name.clone()).collect(),
        count,
        percentage: percentage(count, total),
    })
}
