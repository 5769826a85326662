//! Anomaly detection for data quality assessment.
//!
//! This module checks birth records against their domain constraints: the
//! year of birth must match the year declared by the file name, day and
//! month must fall in their valid ranges, and no row or column may be
//! entirely empty.
//!
//! Each check is independent. A check whose column is absent or unusable
//! fails with a [`CheckError`] that [`detect_anomalies`] turns into a
//! warning, so the remaining checks still run.

use crate::error::CheckError;
use crate::models::{Column, ColumnType, ParsedTable};

use super::config::{QualityConfig, ValueRange};
use super::models::{Anomaly, percentage};

/// Detected anomalies plus warnings for checks that could not run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyOutcome {
    pub anomalies: Vec<Anomaly>,
    pub warnings: Vec<String>,
}

impl AnomalyOutcome {
    fn record(&mut self, check: &str, result: Result<Option<Anomaly>, CheckError>) {
        match result {
            Ok(Some(anomaly)) => self.anomalies.push(anomaly),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!("{} check skipped: {}", check, e);
                self.warnings.push(format!("{} check skipped: {}", check, e));
            }
        }
    }
}

/// Runs every anomaly check on `table`.
///
/// A file without a declared year skips the year check with a warning.
pub fn detect_anomalies(
    table: &ParsedTable,
    config: &QualityConfig,
    declared_year: Option<&str>,
) -> AnomalyOutcome {
    let mut outcome = AnomalyOutcome::default();
    let roles = &config.columns;

    match declared_year {
        Some(year) => outcome.record(
            "year_mismatch",
            check_year_mismatch(table, &roles.year, year),
        ),
        None => outcome
            .warnings
            .push("year_mismatch check skipped: no year token in file name".to_string()),
    }

    outcome.record(
        "invalid_day",
        check_range(table, &roles.day, config.day_range).map(|found| {
            found.map(|(count, description)| Anomaly::InvalidDay { description, count })
        }),
    );
    outcome.record(
        "invalid_month",
        check_range(table, &roles.month, config.month_range).map(|found| {
            found.map(|(count, description)| Anomaly::InvalidMonth { description, count })
        }),
    );
    outcome.record("empty_rows", Ok(check_empty_rows(table)));
    outcome.record("empty_columns", Ok(check_empty_columns(table)));

    outcome
}

fn require<'t>(table: &'t ParsedTable, column: &str) -> Result<&'t Column, CheckError> {
    table.column(column).ok_or_else(|| CheckError::ColumnMissing {
        column: column.to_string(),
    })
}

/// Rows whose year column, compared as text, differs from `expected_year`.
///
/// Missing cells count as mismatches.
pub fn check_year_mismatch(
    table: &ParsedTable,
    column: &str,
    expected_year: &str,
) -> Result<Option<Anomaly>, CheckError> {
    let years = require(table, column)?;
    let count = years
        .cells
        .iter()
        .filter(|cell| cell.canonical_text().is_none_or(|text| text != expected_year))
        .count() as u64;

    if count == 0 {
        return Ok(None);
    }

    Ok(Some(Anomaly::YearMismatch {
        description: format!("Rows with {} different from {}", column, expected_year),
        expected_year: expected_year.to_string(),
        count,
        percentage: percentage(count, table.row_count() as u64),
    }))
}

/// Numeric cells of `column` outside `range`.
///
/// Returns the out-of-range count with a description, or `None` when every
/// value is valid. Missing cells are ignored.
pub fn check_range(
    table: &ParsedTable,
    column: &str,
    range: ValueRange,
) -> Result<Option<(u64, String)>, CheckError> {
    let values = require(table, column)?;
    if values.column_type == ColumnType::Text {
        return Err(CheckError::ColumnNotNumeric {
            column: column.to_string(),
            found: values.column_type.name().to_string(),
        });
    }

    let count = values
        .cells
        .iter()
        .filter_map(|cell| cell.as_f64())
        .filter(|value| !range.contains(*value))
        .count() as u64;

    if count == 0 {
        return Ok(None);
    }

    Ok(Some((
        count,
        format!(
            "Values of {} outside [{}, {}]",
            column, range.min, range.max
        ),
    )))
}

/// Rows where every cell is missing.
pub fn check_empty_rows(table: &ParsedTable) -> Option<Anomaly> {
    if table.column_count() == 0 {
        return None;
    }

    let count = (0..table.row_count())
        .filter(|&row| table.row(row).all(|cell| cell.is_missing()))
        .count() as u64;

    (count > 0).then(|| Anomaly::EmptyRows {
        description: "Rows with every value missing".to_string(),
        count,
    })
}

/// Columns where every cell is missing, in file order.
///
/// A header-only file reports all of its columns.
pub fn check_empty_columns(table: &ParsedTable) -> Option<Anomaly> {
    let columns: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| c.cells.iter().all(|cell| cell.is_missing()))
        .map(|c| c.name.clone())
        .collect();

    (!columns.is_empty()).then(|| Anomaly::EmptyColumns {
        description: "Columns with every value missing".to_string(),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn int_column(name: &str, values: &[Option<i64>]) -> Column {
        Column::new(
            name,
            ColumnType::Integer,
            values
                .iter()
                .map(|v| v.map_or(Cell::Missing, Cell::Integer))
                .collect(),
        )
    }

    fn births(years: &[Option<i64>], days: &[Option<i64>], months: &[Option<i64>]) -> ParsedTable {
        ParsedTable::new(vec![
            int_column("ANO_NAC", years),
            int_column("DIA_NAC", days),
            int_column("MES_NAC", months),
        ])
        .unwrap()
    }

    #[test]
    fn test_year_mismatch_scenario() {
        let table = births(
            &[Some(1996), Some(1997), Some(1996)],
            &[Some(1), Some(2), Some(3)],
            &[Some(1), Some(1), Some(1)],
        );
        let anomaly = check_year_mismatch(&table, "ANO_NAC", "1996")
            .unwrap()
            .unwrap();

        assert_eq!(anomaly.kind(), "year_mismatch");
        assert_eq!(anomaly.count(), 1);
        match anomaly {
            Anomaly::YearMismatch {
                expected_year,
                percentage,
                ..
            } => {
                assert_eq!(expected_year, "1996");
                assert_eq!(percentage, 33.33);
            }
            other => panic!("unexpected anomaly {:?}", other),
        }
    }

    #[test]
    fn test_missing_year_counts_as_mismatch() {
        let table = births(&[Some(1996), None], &[Some(1), Some(1)], &[Some(1), Some(1)]);
        let anomaly = check_year_mismatch(&table, "ANO_NAC", "1996")
            .unwrap()
            .unwrap();
        assert_eq!(anomaly.count(), 1);
    }

    #[test]
    fn test_year_compared_as_text() {
        let table = ParsedTable::new(vec![Column::new(
            "ANO_NAC",
            ColumnType::Text,
            vec![Cell::Text("1996".to_string()), Cell::Text("96".to_string())],
        )])
        .unwrap();
        let anomaly = check_year_mismatch(&table, "ANO_NAC", "1996")
            .unwrap()
            .unwrap();
        assert_eq!(anomaly.count(), 1);
    }

    #[test]
    fn test_no_anomaly_when_count_is_zero() {
        let table = births(&[Some(1996)], &[Some(15)], &[Some(6)]);
        let outcome = detect_anomalies(&table, &QualityConfig::default(), Some("1996"));
        assert!(outcome.anomalies.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_invalid_day_and_month() {
        let table = births(
            &[Some(1996), Some(1996), Some(1996), Some(1996)],
            &[Some(0), Some(31), Some(32), None],
            &[Some(13), Some(12), Some(1), None],
        );
        let outcome = detect_anomalies(&table, &QualityConfig::default(), Some("1996"));

        assert_eq!(outcome.anomalies.len(), 2);
        assert_eq!(outcome.anomalies[0].kind(), "invalid_day");
        assert_eq!(outcome.anomalies[0].count(), 2);
        assert_eq!(outcome.anomalies[1].kind(), "invalid_month");
        assert_eq!(outcome.anomalies[1].count(), 1);
    }

    #[test]
    fn test_range_rejects_text_column() {
        let table = ParsedTable::new(vec![Column::new(
            "DIA_NAC",
            ColumnType::Text,
            vec![Cell::Text("x".to_string())],
        )])
        .unwrap();
        let result = check_range(&table, "DIA_NAC", ValueRange::new(1, 31));
        assert!(matches!(result, Err(CheckError::ColumnNotNumeric { .. })));
    }

    #[test]
    fn test_range_accepts_empty_column() {
        let table = ParsedTable::new(vec![Column::new(
            "DIA_NAC",
            ColumnType::Empty,
            vec![Cell::Missing],
        )])
        .unwrap();
        assert!(
            check_range(&table, "DIA_NAC", ValueRange::new(1, 31))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_missing_columns_become_warnings() {
        let table = ParsedTable::new(vec![int_column("PESO", &[Some(3000)])]).unwrap();
        let outcome = detect_anomalies(&table, &QualityConfig::default(), Some("1996"));

        assert!(outcome.anomalies.is_empty());
        assert_eq!(
            outcome.warnings,
            vec![
                "year_mismatch check skipped: column 'ANO_NAC' not present",
                "invalid_day check skipped: column 'DIA_NAC' not present",
                "invalid_month check skipped: column 'MES_NAC' not present",
            ]
        );
    }

    #[test]
    fn test_year_check_skipped_without_declared_year() {
        let table = births(&[Some(1997)], &[Some(1)], &[Some(1)]);
        let outcome = detect_anomalies(&table, &QualityConfig::default(), None);
        assert!(outcome.anomalies.is_empty());
        assert_eq!(
            outcome.warnings,
            vec!["year_mismatch check skipped: no year token in file name"]
        );
    }

    #[test]
    fn test_empty_rows() {
        let table = births(
            &[Some(1996), None, None],
            &[Some(1), None, Some(2)],
            &[Some(1), None, None],
        );
        let anomaly = check_empty_rows(&table).unwrap();
        assert_eq!(anomaly.count(), 1);
        assert!(check_empty_rows(&ParsedTable::new(Vec::new()).unwrap()).is_none());
    }

    #[test]
    fn test_empty_columns_listed_by_name() {
        let table = ParsedTable::new(vec![
            int_column("ANO_NAC", &[Some(1996), Some(1996)]),
            Column::new("OBS", ColumnType::Empty, vec![Cell::Missing, Cell::Missing]),
        ])
        .unwrap();

        match check_empty_columns(&table) {
            Some(Anomaly::EmptyColumns { columns, .. }) => assert_eq!(columns, vec!["OBS"]),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
