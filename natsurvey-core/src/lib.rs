//! Core data structures and analysis engine for NatSurvey.
//!
//! This crate profiles a batch of yearly birth-registry extracts and finds
//! duplicate records within and across files. It is shared by the
//! `natsurvey` binary and by anything that wants the report as a value.
//!
//! # Guarantees
//! - A file that cannot be read never aborts the batch; it is reported
//! - Only one file's parsed table is in memory at a time
//! - Reports are identical across runs on unchanged input, apart from
//!   `analysis_date`
//!
//! # Architecture
//! Each file goes through load ([`loader`]), hash ([`hashing`]) and profile
//! ([`quality`]). Row digests feed the [`CrossFileIndex`], and the
//! [`report`] module aggregates everything once the batch is done.
//! [`pipeline::BatchAnalyzer`] drives the sequence.

pub mod error;
pub mod hashing;
pub mod index;
pub mod loader;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod source;
pub mod validation;

// Re-export commonly used types
pub use error::{CheckError, NatSurveyError, Result};
pub use hashing::{FileId, RowDigest, RowHashEntry, hash_row, hash_table};
pub use index::{CrossFileIndex, DuplicateGroup, RowLocation};
pub use loader::{LoadFailure, LoadedTable, READ_CONFIGS, TableLoader};
pub use logging::init_logging;
pub use models::{
    Cell, Column, ColumnType, Delimiter, ParsedTable, QuotingMode, ReadConfig, TextEncoding,
};
pub use pipeline::{BatchAnalyzer, analyze_batch};
pub use quality::{FileAnalysis, FileProfiler, QualityConfig, ReportConfig};
pub use report::{QualityReport, REPORT_FORMAT_VERSION, ReportAggregator, ReportSummary};
pub use source::{SourceFile, discover_sources, parse_year_token};

pub use validation::{
    ValidationError, get_report_schema, initialize_report_validator, validate_report_output,
};
