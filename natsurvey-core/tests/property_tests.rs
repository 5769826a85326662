#![allow(clippy::unwrap_used)]
//! Property-based tests for row hashing and duplicate counting.
//!
//! Uses proptest to check the invariants over random tables.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use natsurvey_core::quality::{analyze_exact_duplicates, analyze_key_duplicates};
use natsurvey_core::{
    Cell, Column, ColumnType, CrossFileIndex, FileId, ParsedTable, hash_row, hash_table,
};

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Missing),
        (0i64..4).prop_map(Cell::Integer),
        "[a-c]{0,2}".prop_map(Cell::Text),
    ]
}

/// Tables of 1-3 columns with small value domains, so repeats are common.
fn table_strategy() -> impl Strategy<Value = ParsedTable> {
    (1usize..4, 0usize..30).prop_flat_map(|(columns, rows)| {
        prop::collection::vec(prop::collection::vec(0i64..3, rows), columns).prop_map(
            |values| {
                let columns = values
                    .into_iter()
                    .enumerate()
                    .map(|(i, cells)| {
                        Column::new(
                            format!("C{}", i),
                            ColumnType::Integer,
                            cells.into_iter().map(Cell::Integer).collect(),
                        )
                    })
                    .collect();
                ParsedTable::new(columns).unwrap()
            },
        )
    })
}

proptest! {
    /// Property: hashing is a pure function of the cells
    #[test]
    fn prop_hash_is_deterministic(cells in prop::collection::vec(cell_strategy(), 0..8)) {
        let copy = cells.clone();
        prop_assert_eq!(hash_row(&cells), hash_row(&copy));
    }

    /// Property: appending a missing cell always changes the digest
    #[test]
    fn prop_missing_cell_is_not_ignored(cells in prop::collection::vec(cell_strategy(), 0..8)) {
        let mut longer = cells.clone();
        longer.push(Cell::Missing);
        prop_assert_ne!(hash_row(&cells), hash_row(&longer));
    }

    /// Property: 0 <= exact duplicates <= rows - 1, and equals rows minus distinct rows
    #[test]
    fn prop_exact_duplicates_bounded(table in table_strategy()) {
        let rows = table.row_count() as u64;
        let entries = hash_table(FileId(0), &table);
        let distinct: HashSet<_> = entries.iter().map(|e| e.hash).collect();
        let dup = analyze_exact_duplicates(entries.iter().map(|e| e.hash), rows);

        prop_assert!(dup.count <= rows.saturating_sub(1));
        prop_assert_eq!(dup.count, rows - distinct.len() as u64);
        prop_assert!((0.0..=100.0).contains(&dup.percentage));
    }

    /// Property: a key subset never has fewer duplicates than full rows
    #[test]
    fn prop_key_duplicates_dominate_exact(table in table_strategy()) {
        let rows = table.row_count() as u64;
        let entries = hash_table(FileId(0), &table);
        let exact = analyze_exact_duplicates(entries.iter().map(|e| e.hash), rows);
        let keyed = analyze_key_duplicates(&table, &["C0".to_string()]).unwrap();

        prop_assert!(keyed.count >= exact.count);
        prop_assert!(keyed.count <= rows.saturating_sub(1));
    }

    /// Property: every finalized group spans at least two files
    #[test]
    fn prop_groups_span_files(tables in prop::collection::vec(table_strategy(), 1..4)) {
        let mut index = CrossFileIndex::new();
        let mut occurrences: HashMap<_, Vec<FileId>> = HashMap::new();
        for (i, table) in tables.iter().enumerate() {
            let entries = hash_table(FileId(i), table);
            for entry in &entries {
                occurrences.entry(entry.hash).or_default().push(entry.file);
            }
            index.record(entries);
        }
        let total: usize = tables.iter().map(ParsedTable::row_count).sum();
        prop_assert_eq!(index.len(), total);

        let groups = index.finalize();
        for group in &groups {
            prop_assert!(group.file_count() >= 2);
            prop_assert!(group.locations.windows(2).all(|w| w[0] < w[1]));
        }
        prop_assert!(groups.windows(2).all(|w| w[0].locations[0] < w[1].locations[0]));

        // Brute force: exactly the digests seen in two or more files are grouped,
        // each with every one of its rows
        let expected: HashMap<_, usize> = occurrences
            .into_iter()
            .filter(|(_, files)| files.iter().collect::<HashSet<_>>().len() >= 2)
            .map(|(hash, files)| (hash, files.len()))
            .collect();
        let found: HashMap<_, usize> = groups
            .iter()
            .map(|g| (g.hash, g.locations.len()))
            .collect();
        prop_assert_eq!(found.len(), groups.len());
        prop_assert_eq!(found, expected);
    }
}
