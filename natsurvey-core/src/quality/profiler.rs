//! Per-file profiler facade.
//!
//! This module provides the `FileProfiler` that runs every quality check on
//! one loaded table and assembles the [`FileAnalysis`].

use crate::hashing::{FileId, RowHashEntry, hash_table};
use crate::loader::LoadedTable;
use crate::source::SourceFile;

use super::anomaly::detect_anomalies;
use super::completeness::analyze_completeness;
use super::config::QualityConfig;
use super::consistency::{profile_categories, summarize_types};
use super::models::{DuplicateMetrics, FileAnalysis, FileMetrics};
use super::uniqueness::{analyze_exact_duplicates, analyze_key_duplicates};

/// Profiler for a single file's quality metrics.
///
/// The profiler never fails: problems in individual checks become warnings
/// on the returned analysis, and an internal inconsistency marks the
/// analysis as [`Failed`](super::AnalysisStatus::Failed) while keeping the
/// metrics already computed.
///
/// # Example
///
/// ```rust,ignore
/// use natsurvey_core::quality::FileProfiler;
///
/// let profiler = FileProfiler::with_defaults();
/// let analysis = profiler.profile(FileId(0), &source, &loaded);
/// println!("{} rows, {} anomalies", analysis.metrics.total_rows, analysis.anomalies.len());
/// ```
#[derive(Debug, Clone)]
pub struct FileProfiler {
    config: QualityConfig,
}

impl FileProfiler {
    /// Creates a new profiler with the given configuration.
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Creates a new profiler with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(QualityConfig::default())
    }

    /// Returns a reference to the profiler configuration.
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Hashes and profiles a loaded table.
    pub fn profile(&self, file: FileId, source: &SourceFile, loaded: &LoadedTable) -> FileAnalysis {
        let hashes = hash_table(file, &loaded.table);
        self.profile_hashed(source, loaded, &hashes)
    }

    /// Profiles a loaded table whose row hashes were already computed.
    ///
    /// `hashes` must hold one entry per row, as produced by
    /// [`hash_table`]; the same digests feed the exact-duplicate count.
    pub fn profile_hashed(
        &self,
        source: &SourceFile,
        loaded: &LoadedTable,
        hashes: &[RowHashEntry],
    ) -> FileAnalysis {
        let table = &loaded.table;
        let total_rows = table.row_count() as u64;
        let mut analysis = FileAnalysis::new(source);
        analysis.read_config = Some(loaded.config);

        analysis.metrics = FileMetrics {
            total_rows,
            total_columns: table.column_count() as u64,
            column_names: table.column_names(),
            memory_estimate_bytes: table.memory_estimate_bytes(),
            row_hashes_created: hashes.len() as u64,
            ..FileMetrics::default()
        };

        if hashes.len() != table.row_count() {
            analysis.fail(format_args!(
                "{} row hashes for {} rows",
                hashes.len(),
                table.row_count()
            ));
            tracing::error!("Analysis of {} aborted: row hash count mismatch", source.name);
            return analysis;
        }

        analysis.duplicates = DuplicateMetrics {
            exact_duplicates: analyze_exact_duplicates(hashes.iter().map(|e| e.hash), total_rows),
            key_column_duplicates: analyze_key_duplicates(table, &self.config.key_columns),
        };

        let exact = analysis.duplicates.exact_duplicates.count;
        if exact > 0 {
            analysis
                .warnings
                .push(format!("Found {} exact duplicate rows", exact));
        }
        match &analysis.duplicates.key_column_duplicates {
            Some(keyed) if keyed.count > 0 => analysis.warnings.push(format!(
                "Found {} duplicate rows on key columns {}",
                keyed.count,
                keyed.columns.join(", ")
            )),
            Some(_) => {}
            None => analysis.warnings.push(format!(
                "key_column_duplicates check skipped: none of {} present",
                self.config.key_columns.join(", ")
            )),
        }

        let completeness = analyze_completeness(table, self.config.null_warning_percent);
        analysis.metrics.null_values = completeness.profile;
        analysis.warnings.extend(completeness.warnings);

        analysis.metrics.data_types = summarize_types(table);
        let consistency = profile_categories(table, &self.config.categorical_columns);
        analysis.metrics.consistency = consistency.profiles;
        analysis.warnings.extend(consistency.warnings);

        let anomalies = detect_anomalies(table, &self.config, source.declared_year.as_deref());
        analysis.anomalies = anomalies.anomalies;
        analysis.warnings.extend(anomalies.warnings);

        tracing::debug!(
            "Profiled {}: {} rows, {} anomalies, {} warnings",
            source.name,
            total_rows,
            analysis.anomalies.len(),
            analysis.warnings.len()
        );

        analysis
    }
}

impl Default for FileProfiler {
    fn default() -> Self {
        Self::with_defaults()
    }
}
