//! Completeness analysis for data quality assessment.
//!
//! This module counts missing cells per column and flags columns whose
//! null share exceeds the configured threshold.

use crate::models::ParsedTable;

use super::models::{ColumnNulls, NullProfile, percentage};

/// Null distribution plus threshold warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletenessOutcome {
    pub profile: NullProfile,
    pub warnings: Vec<String>,
}

/// Analyzes missing values of every column.
///
/// A column whose null percentage is strictly above `warning_percent`
/// produces one warning.
pub fn analyze_completeness(table: &ParsedTable, warning_percent: f64) -> CompletenessOutcome {
    let total_rows = table.row_count() as u64;
    let mut columns = Vec::with_capacity(table.column_count());
    let mut warnings = Vec::new();
    let mut total_nulls: u64 = 0;

    for column in table.columns() {
        let count = column.null_count();
        let share = percentage(count, total_rows);
        total_nulls += count;

        if share > warning_percent {
            warnings.push(format!(
                "Column '{}' has {:.2}% null values",
                column.name, share
            ));
        }

        columns.push(ColumnNulls {
            column: column.name.clone(),
            count,
            percentage: share,
        });
    }

    CompletenessOutcome {
        profile: NullProfile {
            total_nulls,
            columns,
        },
        warnings,
    }
}
