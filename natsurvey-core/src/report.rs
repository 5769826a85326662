//! Batch report aggregation.
//!
//! The aggregator combines every per-file analysis with the finalized
//! cross-file duplicate groups into one [`QualityReport`]. It performs no
//! I/O; writing the report is left to the caller.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::hashing::RowDigest;
use crate::index::DuplicateGroup;
use crate::quality::{FileAnalysis, ReportConfig, bytes_to_mb, round2};

/// Report format version emitted by this crate.
pub const REPORT_FORMAT_VERSION: &str = "1.0";

/// One file's analysis under its unique report key.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// File name, or full path when the name repeats within the batch
    pub key: String,
    pub analysis: FileAnalysis,
}

/// A row location rendered with its file key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationReport {
    pub file: String,
    pub row: usize,
}

/// A cross-file duplicate group as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroupReport {
    pub hash: RowDigest,
    pub file_count: usize,
    pub locations: Vec<LocationReport>,
}

/// Cross-file duplicate summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossFileDuplicates {
    /// Groups spanning at least two files
    pub total_duplicate_groups: usize,
    /// Groups carried in `sample_duplicates`
    pub sample_size: usize,
    pub sample_duplicates: Vec<DuplicateGroupReport>,
    /// Every group, serialized only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_groups: Option<Vec<DuplicateGroupReport>>,
    /// Every group as finalized by the index; never serialized
    #[serde(skip)]
    pub groups: Vec<DuplicateGroup>,
}

/// A file flagged for manual review because of its size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspiciousFile {
    pub file: String,
    pub size_bytes: u64,
    pub size_mb: f64,
    pub rows: u64,
}

/// Executive summary of the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_records_analyzed: u64,
    pub total_exact_duplicates: u64,
    /// Kept apart from exact duplicates, never summed with them
    pub total_key_column_duplicates: u64,
    pub files_with_anomalies: usize,
    pub files_with_errors: usize,
    pub average_file_size_bytes: f64,
    pub average_file_size_mb: f64,
    pub suspicious_files: Vec<SuspiciousFile>,
}

/// Complete quality report for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub format_version: String,
    pub tool_version: String,
    pub analysis_date: DateTime<Utc>,
    pub total_files_analyzed: usize,
    /// Serialized as an object keyed by file, in discovery order
    #[serde(serialize_with = "serialize_file_entries")]
    pub individual_file_analysis: Vec<FileEntry>,
    pub cross_file_duplicates: CrossFileDuplicates,
    pub summary: ReportSummary,
}

fn serialize_file_entries<S: Serializer>(
    entries: &[FileEntry],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|e| (&e.key, &e.analysis)))
}

impl QualityReport {
    /// Looks up a file's analysis by report key.
    pub fn file(&self, key: &str) -> Option<&FileAnalysis> {
        self.individual_file_analysis
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.analysis)
    }
}

/// Combines per-file analyses into a [`QualityReport`].
#[derive(Debug, Clone, Default)]
pub struct ReportAggregator {
    config: ReportConfig,
}

impl ReportAggregator {
    /// Creates a new aggregator with the given configuration.
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the aggregator configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Aggregates with the current time as the analysis date.
    pub fn aggregate(&self, entries: Vec<FileEntry>, groups: Vec<DuplicateGroup>) -> QualityReport {
        self.aggregate_at(entries, groups, Utc::now())
    }

    /// Aggregates with an explicit analysis date.
    ///
    /// `entries` must be in discovery order: a group location's `FileId`
    /// indexes into it.
    pub fn aggregate_at(
        &self,
        entries: Vec<FileEntry>,
        groups: Vec<DuplicateGroup>,
        analysis_date: DateTime<Utc>,
    ) -> QualityReport {
        let summary = self.summarize(&entries);

        let rendered: Vec<DuplicateGroupReport> = groups
            .iter()
            .map(|group| render_group(group, &entries))
            .collect();
        let sample: Vec<DuplicateGroupReport> = rendered
            .iter()
            .take(self.config.duplicate_sample_size)
            .cloned()
            .collect();

        let cross_file_duplicates = CrossFileDuplicates {
            total_duplicate_groups: rendered.len(),
            sample_size: sample.len(),
            sample_duplicates: sample,
            all_groups: self.config.include_all_groups.then_some(rendered),
            groups,
        };

        tracing::info!(
            "Aggregated {} files: {} records, {} cross-file duplicate groups",
            entries.len(),
            summary.total_records_analyzed,
            cross_file_duplicates.total_duplicate_groups
        );

        QualityReport {
            format_version: REPORT_FORMAT_VERSION.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            analysis_date,
            total_files_analyzed: entries.len(),
            individual_file_analysis: entries,
            cross_file_duplicates,
            summary,
        }
    }

    fn summarize(&self, entries: &[FileEntry]) -> ReportSummary {
        let analyses = || entries.iter().map(|e| &e.analysis);

        let total_size: u64 = analyses().map(|a| a.file_size_bytes).sum();
        let mean_size = if entries.is_empty() {
            0.0
        } else {
            total_size as f64 / entries.len() as f64
        };
        let threshold = mean_size * self.config.size_outlier_factor;

        let suspicious_files = entries
            .iter()
            .filter(|e| e.analysis.file_size_bytes as f64 > threshold)
            .map(|e| SuspiciousFile {
                file: e.key.clone(),
                size_bytes: e.analysis.file_size_bytes,
                size_mb: e.analysis.file_size_mb,
                rows: e.analysis.metrics.total_rows,
            })
            .collect::<Vec<_>>();

        for file in &suspicious_files {
            tracing::warn!(
                "Suspicious file size: {} ({} bytes, batch mean {:.0})",
                file.file,
                file.size_bytes,
                mean_size
            );
        }

        ReportSummary {
            total_records_analyzed: analyses().map(|a| a.metrics.total_rows).sum(),
            total_exact_duplicates: analyses()
                .map(|a| a.duplicates.exact_duplicates.count)
                .sum(),
            total_key_column_duplicates: analyses()
                .filter_map(|a| a.duplicates.key_column_duplicates.as_ref())
                .map(|k| k.count)
                .sum(),
            files_with_anomalies: analyses().filter(|a| a.has_anomalies()).count(),
            files_with_errors: analyses().filter(|a| a.has_errors()).count(),
            average_file_size_bytes: round2(mean_size),
            average_file_size_mb: bytes_to_mb(mean_size),
            suspicious_files,
        }
    }
}

fn render_group(group: &DuplicateGroup, entries: &[FileEntry]) -> DuplicateGroupReport {
    DuplicateGroupReport {
        hash: group.hash,
        file_count: group.file_count(),
        locations: group
            .locations
            .iter()
            .map(|location| LocationReport {
                file: entries.get(location.file.0).map_or_else(
                    || format!("file #{}", location.file.0),
                    |e| e.key.clone(),
                ),
                row: location.row,
            })
            .collect(),
    }
}
