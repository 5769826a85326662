//! Quality assessment configuration.
//!
//! This module provides configuration for per-file profiling (column roles,
//! key columns, thresholds) and for report aggregation (size outlier factor,
//! duplicate sampling).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default key columns for key-subset duplicate detection.
pub const DEFAULT_KEY_COLUMNS: [&str; 5] = ["SEXO", "DIA_NAC", "MES_NAC", "ANO_NAC", "TIPO_PARTO"];

/// Default categorical columns for consistency profiling.
pub const DEFAULT_CATEGORICAL_COLUMNS: [&str; 4] =
    ["SEXO", "TIPO_PARTO", "TIPO_ATENC", "ATENC_PART"];

/// Null percentage above which a column gets a warning.
pub const DEFAULT_NULL_WARNING_PERCENT: f64 = 50.0;

/// Files larger than this multiple of the batch mean are flagged.
pub const DEFAULT_SIZE_OUTLIER_FACTOR: f64 = 1.3;

/// Number of cross-file duplicate groups kept in the report sample.
pub const DEFAULT_DUPLICATE_SAMPLE_SIZE: usize = 10;

/// Inclusive integer range for domain checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: i64,
    pub max: i64,
}

impl ValueRange {
    /// Creates an inclusive range.
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min as f64 && value <= self.max as f64
    }
}

/// Names of the columns with a fixed meaning in the checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// Year of birth, compared against the file's declared year
    pub year: String,
    /// Day of birth
    pub day: String,
    /// Month of birth
    pub month: String,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            year: "ANO_NAC".to_string(),
            day: "DIA_NAC".to_string(),
            month: "MES_NAC".to_string(),
        }
    }
}

/// Per-file quality profiling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Columns for key-subset duplicate detection
    pub key_columns: Vec<String>,
    /// Year/day/month column names
    pub columns: ColumnRoles,
    /// Columns profiled for category frequencies
    pub categorical_columns: Vec<String>,
    /// Null percentage warning threshold (0-100)
    pub null_warning_percent: f64,
    /// Valid day-of-birth range
    pub day_range: ValueRange,
    /// Valid month-of-birth range
    pub month_range: ValueRange,
}

/// Validation errors for quality and report configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("null_warning_percent must be between 0.0 and 100.0, got {0}")]
    InvalidNullThreshold(f64),
    #[error("{name} range is empty: min {min} > max {max}")]
    InvalidRange { name: &'static str, min: i64, max: i64 },
    #[error("size_outlier_factor must be a positive finite number, got {0}")]
    InvalidSizeOutlierFactor(f64),
    #[error("column names must not be empty ({0})")]
    EmptyColumnName(&'static str),
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            key_columns: DEFAULT_KEY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            columns: ColumnRoles::default(),
            categorical_columns: DEFAULT_CATEGORICAL_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            null_warning_percent: DEFAULT_NULL_WARNING_PERCENT,
            day_range: ValueRange::new(1, 31),
            month_range: ValueRange::new(1, 12),
        }
    }
}

impl QualityConfig {
    /// Creates a new quality config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the key columns.
    pub fn with_key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the categorical columns.
    pub fn with_categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the year/day/month column names.
    pub fn with_column_roles(mut self, roles: ColumnRoles) -> Self {
        self.columns = roles;
        self
    }

    /// Builder method to set the null warning threshold.
    pub fn with_null_warning_percent(mut self, percent: f64) -> Self {
        if !(0.0..=100.0).contains(&percent) {
            tracing::warn!(
                "null_warning_percent {} clamped to valid range [0.0, 100.0]",
                percent
            );
        }
        self.null_warning_percent = percent.clamp(0.0, 100.0);
        self
    }

    /// Builder method to set the valid day range.
    pub fn with_day_range(mut self, range: ValueRange) -> Self {
        self.day_range = range;
        self
    }

    /// Builder method to set the valid month range.
    pub fn with_month_range(mut self, range: ValueRange) -> Self {
        self.month_range = range;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=100.0).contains(&self.null_warning_percent) {
            return Err(ConfigValidationError::InvalidNullThreshold(
                self.null_warning_percent,
            ));
        }
        for (name, range) in [("day", self.day_range), ("month", self.month_range)] {
            if range.min > range.max {
                return Err(ConfigValidationError::InvalidRange {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if self.key_columns.iter().any(|c| c.is_empty()) {
            return Err(ConfigValidationError::EmptyColumnName("key_columns"));
        }
        if self.categorical_columns.iter().any(|c| c.is_empty()) {
            return Err(ConfigValidationError::EmptyColumnName("categorical_columns"));
        }
        let roles = &self.columns;
        if roles.year.is_empty() || roles.day.is_empty() || roles.month.is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("columns"));
        }
        Ok(())
    }
}

/// Report aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Multiple of the mean file size above which a file is suspicious
    pub size_outlier_factor: f64,
    /// Cross-file duplicate groups kept in the sample
    pub duplicate_sample_size: usize,
    /// Serialize every cross-file group, not just the sample
    pub include_all_groups: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            size_outlier_factor: DEFAULT_SIZE_OUTLIER_FACTOR,
            duplicate_sample_size: DEFAULT_DUPLICATE_SAMPLE_SIZE,
            include_all_groups: false,
        }
    }
}

impl ReportConfig {
    /// Creates a new report config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the size outlier factor.
    pub fn with_size_outlier_factor(mut self, factor: f64) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            tracing::warn!(
                "size_outlier_factor {} ignored, keeping {}",
                factor,
                self.size_outlier_factor
            );
            return self;
        }
        self.size_outlier_factor = factor;
        self
    }

    /// Builder method to set the duplicate sample size.
    pub fn with_duplicate_sample_size(mut self, size: usize) -> Self {
        self.duplicate_sample_size = size;
        self
    }

    /// Builder method to include every cross-file group in the output.
    pub fn with_all_groups(mut self, include: bool) -> Self {
        self.include_all_groups = include;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.size_outlier_factor.is_finite() && self.size_outlier_factor > 0.0) {
            return Err(ConfigValidationError::InvalidSizeOutlierFactor(
                self.size_outlier_factor,
            ));
        }
        Ok(())
    }
}
