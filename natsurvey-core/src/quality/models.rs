//! Per-file quality analysis models.
//!
//! This module defines the data structures for one file's quality
//! assessment. A [`FileAnalysis`] is produced for every discovered file,
//! including files that could not be read, so the report always accounts
//! for the whole batch.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::models::{ColumnType, ReadConfig};
use crate::source::SourceFile;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Percentage of `count` in `total`, rounded to two decimals.
///
/// An empty total gives 0.0.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}

/// Rounds to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts bytes to megabytes, rounded to two decimals.
pub fn bytes_to_mb(bytes: f64) -> f64 {
    round2(bytes / BYTES_PER_MB)
}

/// Count and share of duplicated rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DuplicateCount {
    pub count: u64,
    pub percentage: f64,
}

impl DuplicateCount {
    /// Creates a duplicate count over `total` rows.
    pub fn new(count: u64, total: u64) -> Self {
        if total > 0 && count >= total {
            tracing::warn!(
                "Quality metrics anomaly: duplicate count ({}) not below row count ({})",
                count,
                total
            );
        }
        Self {
            count,
            percentage: percentage(count, total),
        }
    }
}

/// Duplicates restricted to the key columns present in the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyColumnDuplicates {
    /// Key columns actually used, in configured order
    pub columns: Vec<String>,
    pub count: u64,
    pub percentage: f64,
}

/// Within-file duplicate metrics. The two counts are never summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateMetrics {
    /// Full-row repeats of an earlier row
    pub exact_duplicates: DuplicateCount,
    /// Key-subset repeats; absent when no key column is present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_column_duplicates: Option<KeyColumnDuplicates>,
}

/// Null statistics for a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnNulls {
    pub column: String,
    pub count: u64,
    pub percentage: f64,
}

/// Null statistics for a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NullProfile {
    /// Missing cells across all columns
    pub total_nulls: u64,
    /// One entry per column, in file order
    pub columns: Vec<ColumnNulls>,
}

/// Frequency of one categorical value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// Value distribution of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProfile {
    pub column: String,
    /// Distinct non-missing values
    pub unique_values: u64,
    /// Counts by value, most frequent first
    #[serde(serialize_with = "serialize_value_counts")]
    pub value_counts: Vec<ValueCount>,
}

fn serialize_value_counts<S: Serializer>(
    counts: &[ValueCount],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(counts.iter().map(|v| (&v.value, v.count)))
}

/// A detected domain or structural anomaly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anomaly {
    /// Year-of-birth differs from the year in the file name
    YearMismatch {
        description: String,
        expected_year: String,
        count: u64,
        percentage: f64,
    },
    /// Day-of-birth outside the valid range
    InvalidDay { description: String, count: u64 },
    /// Month-of-birth outside the valid range
    InvalidMonth { description: String, count: u64 },
    /// Rows where every cell is missing
    EmptyRows { description: String, count: u64 },
    /// Columns where every cell is missing
    EmptyColumns {
        description: String,
        columns: Vec<String>,
    },
}

impl Anomaly {
    /// The anomaly's type tag, as serialized.
    pub fn kind(&self) -> &'static str {
        match self {
            Anomaly::YearMismatch { .. } => "year_mismatch",
            Anomaly::InvalidDay { .. } => "invalid_day",
            Anomaly::InvalidMonth { .. } => "invalid_month",
            Anomaly::EmptyRows { .. } => "empty_rows",
            Anomaly::EmptyColumns { .. } => "empty_columns",
        }
    }

    /// Number of affected rows, or of columns for `EmptyColumns`.
    pub fn count(&self) -> u64 {
        match self {
            Anomaly::YearMismatch { count, .. }
            | Anomaly::InvalidDay { count, .. }
            | Anomaly::InvalidMonth { count, .. }
            | Anomaly::EmptyRows { count, .. } => *count,
            Anomaly::EmptyColumns { columns, .. } => columns.len() as u64,
        }
    }
}

/// Structural and profiling metrics of one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileMetrics {
    pub total_rows: u64,
    pub total_columns: u64,
    pub column_names: Vec<String>,
    pub memory_estimate_bytes: u64,
    pub null_values: NullProfile,
    /// Column count per resolved type
    pub data_types: BTreeMap<ColumnType, u64>,
    /// Categorical profiles for the configured columns present
    pub consistency: Vec<CategoryProfile>,
    /// Entries contributed to the cross-file index
    pub row_hashes_created: u64,
}

/// Outcome of one file's analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Loaded and profiled; check-level warnings may still be present
    Analyzed,
    /// No read configuration could parse the file
    Unreadable,
    /// Loaded, but the analysis hit an unexpected error part way
    Failed,
}

/// Complete quality analysis for a single file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAnalysis {
    pub file_name: String,
    pub file_size_bytes: u64,
    pub file_size_mb: f64,
    pub declared_year: Option<String>,
    pub status: AnalysisStatus,
    /// Winning read configuration, if any
    pub read_config: Option<ReadConfig>,
    pub metrics: FileMetrics,
    pub duplicates: DuplicateMetrics,
    pub anomalies: Vec<Anomaly>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl FileAnalysis {
    /// Creates an empty analysis for `source`.
    pub fn new(source: &SourceFile) -> Self {
        Self {
            file_name: source.name.clone(),
            file_size_bytes: source.size_bytes,
            file_size_mb: bytes_to_mb(source.size_bytes as f64),
            declared_year: source.declared_year.clone(),
            status: AnalysisStatus::Analyzed,
            read_config: None,
            metrics: FileMetrics::default(),
            duplicates: DuplicateMetrics::default(),
            anomalies: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Creates the analysis of a file that could not be read.
    pub fn unreadable(source: &SourceFile, error: impl Into<String>) -> Self {
        let mut analysis = Self::new(source);
        analysis.status = AnalysisStatus::Unreadable;
        analysis.errors.push(error.into());
        analysis
    }

    /// Creates the analysis of a file that hit an unexpected error.
    ///
    /// The error is recorded as `Critical error: <error>`.
    pub fn failed(source: &SourceFile, error: impl std::fmt::Display) -> Self {
        let mut analysis = Self::new(source);
        analysis.fail(error);
        analysis
    }

    /// Marks this analysis as failed, keeping the metrics already set.
    pub fn fail(&mut self, error: impl std::fmt::Display) {
        self.status = AnalysisStatus::Failed;
        self.errors.push(format!("Critical error: {error}"));
    }

    /// Whether at least one anomaly was detected.
    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }

    /// Whether at least one error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Looks up an anomaly by type tag.
    pub fn anomaly(&self, kind: &str) -> Option<&Anomaly> {
        self.anomalies.iter().find(|a| a.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(0, 10), 0.0);
        assert_eq!(percentage(10, 10), 100.0);
    }

    #[test]
    fn test_percentage_empty_total() {
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(1024.0 * 1024.0), 1.0);
        assert_eq!(bytes_to_mb(1024.0 * 1024.0 * 2.5), 2.5);
        assert_eq!(bytes_to_mb(0.0), 0.0);
    }

    #[test]
    fn test_duplicate_count() {
        let dup = DuplicateCount::new(1, 3);
        assert_eq!(dup.count, 1);
        assert_eq!(dup.percentage, 33.33);
    }

    #[test]
    fn test_anomaly_serializes_with_type_tag() {
        let anomaly = Anomaly::YearMismatch {
            description: "rows with ANO_NAC different from 1996".to_string(),
            expected_year: "1996".to_string(),
            count: 1,
            percentage: 50.0,
        };
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["type"], "year_mismatch");
        assert_eq!(json["count"], 1);
        assert_eq!(anomaly.kind(), "year_mismatch");

        let anomaly = Anomaly::EmptyColumns {
            description: "fully empty columns".to_string(),
            columns: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(anomaly.count(), 2);
        assert_eq!(serde_json::to_value(&anomaly).unwrap()["type"], "empty_columns");
    }

    #[test]
    fn test_value_counts_serialize_as_ordered_map() {
        let profile = CategoryProfile {
            column: "SEXO".to_string(),
            unique_values: 2,
            value_counts: vec![
                ValueCount {
                    value: "2".to_string(),
                    count: 5,
                },
                ValueCount {
                    value: "1".to_string(),
                    count: 3,
                },
            ],
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains(r#""value_counts":{"2":5,"1":3}"#));
    }

    #[test]
    fn test_data_types_serialize_with_names() {
        let mut metrics = FileMetrics::default();
        metrics.data_types.insert(ColumnType::Text, 1);
        metrics.data_types.insert(ColumnType::Integer, 3);
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["data_types"]["integer"], 3);
        assert_eq!(json["data_types"]["text"], 1);
    }

    #[test]
    fn test_unreadable_analysis() {
        let source = SourceFile::new("NAC_1990.csv", 10);
        let analysis = FileAnalysis::unreadable(&source, "unreadable");
        assert_eq!(analysis.status, AnalysisStatus::Unreadable);
        assert!(analysis.has_errors());
        assert!(!analysis.has_anomalies());
        assert_eq!(analysis.metrics.total_rows, 0);
        assert_eq!(analysis.declared_year.as_deref(), Some("1990"));
    }

    #[test]
    fn test_failed_analysis_keeps_metrics() {
        let source = SourceFile::new("NAC_1990.csv", 10);
        let mut analysis = FileAnalysis::new(&source);
        analysis.metrics.total_rows = 4;
        analysis.fail("row hash count mismatch");

        assert_eq!(analysis.status, AnalysisStatus::Failed);
        assert_eq!(analysis.errors, vec!["Critical error: row hash count mismatch"]);
        assert_eq!(analysis.metrics.total_rows, 4);
        assert_eq!(
            FileAnalysis::failed(&source, "boom").errors,
            vec!["Critical error: boom"]
        );
    }
}
