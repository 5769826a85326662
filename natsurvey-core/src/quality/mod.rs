//! Data quality assessment module.
//!
//! This module profiles one birth-registry file at a time:
//! - **Uniqueness**: exact full-row and key-column duplicates
//! - **Completeness**: missing values per column
//! - **Consistency**: resolved column types and categorical frequencies
//! - **Anomaly Detection**: year mismatch, day/month out of range, empty rows
//!   and columns
//!
//! Every discovered file yields a [`FileAnalysis`], including files that
//! could not be read, so aggregation always sees the whole batch.
//!
//! # Example
//! ```rust,ignore
//! use natsurvey_core::quality::{FileProfiler, QualityConfig};
//!
//! let profiler = FileProfiler::new(QualityConfig::default());
//! let analysis = profiler.profile(FileId(0), &source, &loaded);
//! println!("{} warnings", analysis.warnings.len());
//! ```

mod anomaly;
mod completeness;
mod config;
mod consistency;
mod models;
mod profiler;
mod uniqueness;

// Re-export public API
pub use anomaly::{
    AnomalyOutcome, check_empty_columns, check_empty_rows, check_range, check_year_mismatch,
    detect_anomalies,
};
pub use completeness::{CompletenessOutcome, analyze_completeness};
pub use config::{
    ColumnRoles, ConfigValidationError, DEFAULT_CATEGORICAL_COLUMNS,
    DEFAULT_DUPLICATE_SAMPLE_SIZE, DEFAULT_KEY_COLUMNS, DEFAULT_NULL_WARNING_PERCENT,
    DEFAULT_SIZE_OUTLIER_FACTOR, QualityConfig, ReportConfig, ValueRange,
};
pub use consistency::{ConsistencyOutcome, profile_categories, profile_column, summarize_types};
pub use models::{
    AnalysisStatus, Anomaly, CategoryProfile, ColumnNulls, DuplicateCount, DuplicateMetrics,
    FileAnalysis, FileMetrics, KeyColumnDuplicates, NullProfile, ValueCount, bytes_to_mb,
    percentage, round2,
};
pub use profiler::FileProfiler;
pub use uniqueness::{analyze_exact_duplicates, analyze_key_duplicates, count_repeated};
