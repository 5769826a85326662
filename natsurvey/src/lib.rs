//! Library module for the natsurvey binary.
//!
//! This module exposes the command-line surface and the helpers that turn
//! it into core configuration, so they can be tested without a process.
//! The batch itself runs in `main.rs`.

pub mod output;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use natsurvey_core::quality::{
    DEFAULT_DUPLICATE_SAMPLE_SIZE, DEFAULT_NULL_WARNING_PERCENT, DEFAULT_SIZE_OUTLIER_FACTOR,
};
use natsurvey_core::{QualityConfig, QualityReport, ReportConfig, Result, discover_sources};

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "natsurvey")]
#[command(about = "Data quality and duplicate analysis for yearly birth-registry extracts")]
#[command(version)]
#[command(long_about = "
NatSurvey - Birth-registry data quality report

Each input file is loaded with the first working read configuration,
profiled, and hashed row by row to find duplicates within and across files:
- Exact and key-column duplicates per file
- Null share per column and resolved column types
- Year mismatch, invalid day/month, empty rows and columns
- Rows shared between files, and files of suspicious size

An unreadable file is reported, never fatal to the batch.

EXAMPLES:
  natsurvey data/
  natsurvey --output report.json data/NAC_1996.csv data/NAC_1997.csv
  natsurvey --key-columns SEXO,ANO_NAC --all-groups data/
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Input directories or files
    #[arg(
        required = true,
        value_name = "PATH",
        help = "Directories (scanned for PREFIX*.EXT files) or individual files"
    )]
    pub inputs: Vec<PathBuf>,

    /// File name prefix used when scanning directories
    #[arg(long, env = "NATSURVEY_PREFIX", default_value = "NAC_")]
    pub prefix: String,

    /// File extension used when scanning directories
    #[arg(long, env = "NATSURVEY_EXTENSION", default_value = "csv")]
    pub extension: String,

    /// Output file path
    #[arg(
        short,
        long,
        env = "NATSURVEY_OUTPUT",
        default_value = "quality_report.json",
        help = "Output file path (.json, or .json.zst with --compress)"
    )]
    pub output: PathBuf,

    /// Key columns for key-column duplicates
    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma-separated key columns (default SEXO,DIA_NAC,MES_NAC,ANO_NAC,TIPO_PARTO)"
    )]
    pub key_columns: Vec<String>,

    /// Null percentage warning threshold
    #[arg(
        long,
        env = "NATSURVEY_NULL_WARNING_THRESHOLD",
        default_value_t = DEFAULT_NULL_WARNING_PERCENT,
        help = "Warn when a column's null percentage exceeds this value (0-100)"
    )]
    pub null_warning_threshold: f64,

    /// Size outlier factor
    #[arg(
        long,
        env = "NATSURVEY_SIZE_OUTLIER_FACTOR",
        default_value_t = DEFAULT_SIZE_OUTLIER_FACTOR,
        help = "Flag files larger than this multiple of the mean file size"
    )]
    pub size_outlier_factor: f64,

    /// Cross-file duplicate groups in the sample
    #[arg(
        long,
        default_value_t = DEFAULT_DUPLICATE_SAMPLE_SIZE,
        help = "Number of cross-file duplicate groups kept in the sample"
    )]
    pub sample_groups: usize,

    /// Serialize every cross-file group
    #[arg(long, help = "Include every cross-file duplicate group, not just the sample")]
    pub all_groups: bool,

    /// Enable compression
    #[arg(long, help = "Compress output using Zstandard (.json.zst)")]
    pub compress: bool,
}

/// Logging flags shared by every invocation
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

impl Cli {
    /// Builds the per-file profiling configuration from the flags.
    #[must_use]
    pub fn quality_config(&self) -> QualityConfig {
        let config = QualityConfig::new().with_null_warning_percent(self.null_warning_threshold);
        if self.key_columns.is_empty() {
            return config;
        }
        config.with_key_columns(self.key_columns.iter().map(|c| c.trim().to_string()))
    }

    /// Builds the report configuration from the flags.
    #[must_use]
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig::new()
            .with_size_outlier_factor(self.size_outlier_factor)
            .with_duplicate_sample_size(self.sample_groups)
            .with_all_groups(self.all_groups)
    }

    /// Output path, with `.zst` appended when compressing.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        if self.compress && self.output.extension().is_none_or(|ext| ext != "zst") {
            let mut name = self.output.clone().into_os_string();
            name.push(".zst");
            PathBuf::from(name)
        } else {
            self.output.clone()
        }
    }
}

/// Expands the inputs into an ordered file list.
///
/// Directories are scanned with [`discover_sources`] and contribute their
/// matches sorted by name; files are taken as given. Order is preserved and
/// a path listed twice is only analyzed once.
///
/// # Errors
///
/// Returns an error if a directory cannot be listed.
pub fn collect_inputs(inputs: &[PathBuf], prefix: &str, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for input in inputs {
        let found = if input.is_dir() {
            discover_sources(input, prefix, extension)?
        } else {
            vec![input.clone()]
        };
        for path in found {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}

/// Renders the executive summary printed after a run.
#[must_use]
pub fn format_summary(report: &QualityReport, output: &Path) -> String {
    let summary = &report.summary;
    let mut text = String::new();

    let _ = writeln!(text, "natsurvey v{}", report.tool_version);
    let _ = writeln!(text, "Files analyzed: {}", report.total_files_analyzed);
    let _ = writeln!(text, "Records analyzed: {}", summary.total_records_analyzed);
    let _ = writeln!(text, "Exact duplicates: {}", summary.total_exact_duplicates);
    let _ = writeln!(
        text,
        "Key-column duplicates: {}",
        summary.total_key_column_duplicates
    );
    let _ = writeln!(
        text,
        "Cross-file duplicate groups: {}",
        report.cross_file_duplicates.total_duplicate_groups
    );
    let _ = writeln!(text, "Files with anomalies: {}", summary.files_with_anomalies);
    let _ = writeln!(text, "Files with errors: {}", summary.files_with_errors);
    let _ = writeln!(
        text,
        "Average file size: {:.2} MB",
        summary.average_file_size_mb
    );

    if summary.suspicious_files.is_empty() {
        let _ = writeln!(text, "Suspicious files: none");
    } else {
        let _ = writeln!(text, "Suspicious files:");
        for file in &summary.suspicious_files {
            let _ = writeln!(
                text,
                "  {} ({:.2} MB, {} rows)",
                file.file, file.size_mb, file.rows
            );
        }
    }

    let _ = write!(text, "Report: {}", output.display());
    text
}
