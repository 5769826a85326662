//! Consistency profiling for data quality assessment.
//!
//! This module summarizes resolved column types and the value distribution
//! of the configured categorical columns.

use std::collections::{BTreeMap, HashMap};

use crate::error::CheckError;
use crate::models::{Column, ColumnType, ParsedTable};

use super::models::{CategoryProfile, ValueCount};

/// Column count per resolved type. Every type appears, with 0 if absent.
pub fn summarize_types(table: &ParsedTable) -> BTreeMap<ColumnType, u64> {
    let mut histogram: BTreeMap<ColumnType, u64> = [
        ColumnType::Integer,
        ColumnType::Real,
        ColumnType::Text,
        ColumnType::Empty,
    ]
    .into_iter()
    .map(|t| (t, 0))
    .collect();

    for column in table.columns() {
        *histogram.entry(column.column_type).or_insert(0) += 1;
    }
    histogram
}

/// Category profiles and the columns that could not be profiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsistencyOutcome {
    pub profiles: Vec<CategoryProfile>,
    pub warnings: Vec<String>,
}

/// Profiles the categorical columns present in `table`, in configured order.
///
/// Each absent column is skipped with a warning naming it.
pub fn profile_categories(table: &ParsedTable, columns: &[String]) -> ConsistencyOutcome {
    let mut outcome = ConsistencyOutcome::default();
    for name in columns {
        match table.column(name) {
            Some(column) => outcome.profiles.push(profile_column(column)),
            None => outcome.warnings.push(format!(
                "consistency check skipped: {}",
                CheckError::ColumnMissing {
                    column: name.clone()
                }
            )),
        }
    }
    outcome
}

/// Distinct count and frequency table of one column, missing values
/// excluded.
pub fn profile_column(column: &Column) -> CategoryProfile {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for text in column.cells.iter().filter_map(|cell| cell.canonical_text()) {
        *counts.entry(text.into_owned()).or_insert(0) += 1;
    }

    let mut value_counts: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    value_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    CategoryProfile {
        column: column.name.clone(),
        unique_values: value_counts.len() as u64,
        value_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn sexo(values: &[Option<i64>]) -> Column {
        Column::new(
            "SEXO",
            ColumnType::Integer,
            values
                .iter()
                .map(|v| v.map_or(Cell::Missing, Cell::Integer))
                .collect(),
        )
    }

    #[test]
    fn test_type_histogram() {
        let table = ParsedTable::new(vec![
            sexo(&[Some(1)]),
            Column::new("PESO", ColumnType::Real, vec![Cell::Real(3.2)]),
            Column::new("OBS", ColumnType::Empty, vec![Cell::Missing]),
        ])
        .unwrap();
        let histogram = summarize_types(&table);

        assert_eq!(histogram[&ColumnType::Integer], 1);
        assert_eq!(histogram[&ColumnType::Real], 1);
        assert_eq!(histogram[&ColumnType::Text], 0);
        assert_eq!(histogram[&ColumnType::Empty], 1);
    }

    #[test]
    fn test_value_counts_ordering() {
        let profile = profile_column(&sexo(&[Some(2), Some(1), Some(2), Some(3), Some(1), None]));

        assert_eq!(profile.unique_values, 3);
        let ordered: Vec<(&str, u64)> = profile
            .value_counts
            .iter()
            .map(|v| (v.value.as_str(), v.count))
            .collect();
        assert_eq!(ordered, vec![("1", 2), ("2", 2), ("3", 1)]);
    }

    #[test]
    fn test_profile_skips_absent_columns() {
        let table = ParsedTable::new(vec![sexo(&[Some(1), Some(2)])]).unwrap();
        let columns = vec!["TIPO_PARTO".to_string(), "SEXO".to_string()];
        let outcome = profile_categories(&table, &columns);

        assert_eq!(outcome.profiles.len(), 1);
        assert_eq!(outcome.profiles[0].column, "SEXO");
        assert_eq!(
            outcome.warnings,
            vec!["consistency check skipped: column 'TIPO_PARTO' not present"]
        );
    }

    #[test]
    fn test_all_missing_column_profile() {
        let profile = profile_column(&sexo(&[None, None]));
        assert_eq!(profile.unique_values, 0);
        assert!(profile.value_counts.is_empty());
    }
}
