//! Table loader with ordered read-configuration fallback.
//!
//! The loader tries a fixed list of (delimiter, encoding, quoting)
//! combinations and keeps the first one that parses. Later configurations
//! are never tried once one succeeds, so the choice is deterministic but not
//! "best" by any other measure.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use thiserror::Error;

use crate::models::{
    Cell, Column, ColumnType, Delimiter, ParsedTable, QuotingMode, ReadConfig, TextEncoding,
};
use crate::{NatSurveyError, Result};

/// Read configurations in priority order.
pub const READ_CONFIGS: [ReadConfig; 5] = [
    ReadConfig::new(Delimiter::Semicolon, TextEncoding::Utf8, QuotingMode::Minimal),
    ReadConfig::new(Delimiter::Semicolon, TextEncoding::Latin1, QuotingMode::Minimal),
    ReadConfig::new(Delimiter::Semicolon, TextEncoding::Iso8859_1, QuotingMode::Minimal),
    ReadConfig::new(Delimiter::Comma, TextEncoding::Utf8, QuotingMode::Minimal),
    ReadConfig::new(Delimiter::Semicolon, TextEncoding::Utf8, QuotingMode::None),
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A successfully loaded table and the configuration that produced it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: ParsedTable,
    pub config: ReadConfig,
    /// Configurations that were tried and rejected before `config`
    pub rejected: Vec<FailedAttempt>,
}

/// One rejected read configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub config: ReadConfig,
    pub reason: String,
}

/// The file could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// The bytes could not be read at all
    #[error("unreadable: failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every read configuration was rejected
    #[error(
        "unreadable: no read configuration succeeded for {} ({} attempts)",
        path.display(),
        attempts.len()
    )]
    AllConfigsFailed {
        path: PathBuf,
        attempts: Vec<FailedAttempt>,
    },
}

impl From<LoadFailure> for NatSurveyError {
    fn from(failure: LoadFailure) -> Self {
        match failure {
            LoadFailure::Io { path, source } => {
                NatSurveyError::io(format!("Failed to read {}", path.display()), source)
            }
            LoadFailure::AllConfigsFailed { path, attempts } => {
                NatSurveyError::unreadable(&path, attempts.len())
            }
        }
    }
}

/// Loads delimited text files into [`ParsedTable`]s.
#[derive(Debug, Clone)]
pub struct TableLoader {
    configs: Vec<ReadConfig>,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self {
            configs: READ_CONFIGS.to_vec(),
        }
    }
}

impl TableLoader {
    /// Creates a loader with the default configuration order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader that tries `configs` in the given order.
    pub fn with_configs(configs: Vec<ReadConfig>) -> Self {
        Self { configs }
    }

    /// Configurations in the order they are tried.
    pub fn configs(&self) -> &[ReadConfig] {
        &self.configs
    }

    /// Reads `path` and parses it with the first working configuration.
    pub fn load(&self, path: &Path) -> std::result::Result<LoadedTable, LoadFailure> {
        let bytes = std::fs::read(path).map_err(|source| LoadFailure::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_bytes(path, &bytes)
    }

    /// Parses already-read bytes; `path` is only used for reporting.
    pub fn load_bytes(
        &self,
        path: &Path,
        bytes: &[u8],
    ) -> std::result::Result<LoadedTable, LoadFailure> {
        let mut rejected = Vec::new();

        for config in &self.configs {
            match parse_with(bytes, config) {
                Ok(table) => {
                    tracing::debug!(
                        "Parsed {} with {} ({} rows, {} columns)",
                        path.display(),
                        config,
                        table.row_count(),
                        table.column_count()
                    );
                    return Ok(LoadedTable {
                        table,
                        config: *config,
                        rejected,
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        "Read config {} rejected for {}: {}",
                        config,
                        path.display(),
                        e
                    );
                    rejected.push(FailedAttempt {
                        config: *config,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::warn!(
            "No read configuration could parse {} ({} attempts)",
            path.display(),
            rejected.len()
        );
        Err(LoadFailure::AllConfigsFailed {
            path: path.to_path_buf(),
            attempts: rejected,
        })
    }
}

/// Decodes and parses `bytes` with exactly one configuration.
///
/// Nothing is retained if the attempt fails part way.
pub fn parse_with(bytes: &[u8], config: &ReadConfig) -> Result<ParsedTable> {
    let text = decode(bytes, config.encoding)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter.byte())
        .has_headers(true)
        .flexible(true)
        .quoting(config.quoting == QuotingMode::Minimal)
        .quote(b'"')
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| NatSurveyError::parse(format!("Failed to read header row: {}", e)))?
        .clone();

    if headers.is_empty() {
        return Err(NatSurveyError::parse("No columns to parse"));
    }

    let width = headers.len();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            NatSurveyError::parse(format!("Failed to parse record {}: {}", index + 1, e))
        })?;

        if record.len() > width {
            return Err(NatSurveyError::parse(format!(
                "Record {} has {} fields, header has {}",
                index + 1,
                record.len(),
                width
            )));
        }

        // Short records are padded with missing cells
        for (position, column) in raw.iter_mut().enumerate() {
            let field = record.get(position).filter(|f| !f.is_empty());
            column.push(field.map(str::to_string));
        }
    }

    let columns = headers
        .iter()
        .zip(raw)
        .map(|(name, fields)| build_column(name, fields))
        .collect();

    ParsedTable::new(columns)
}

/// Strictly decodes `bytes`; malformed input rejects the configuration.
fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>> {
    let resolved = encoding.decoder();

    let payload = if resolved == encoding_rs::UTF_8 {
        bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
    } else {
        bytes
    };

    resolved
        .decode_without_bom_handling_and_without_replacement(payload)
        .ok_or_else(|| {
            NatSurveyError::parse(format!("Input is not valid {}", encoding.label()))
        })
}

/// Resolves a column's type from all of its fields, then types each cell.
fn build_column(name: &str, fields: Vec<Option<String>>) -> Column {
    let column_type = resolve_column_type(&fields);

    let cells = fields
        .into_iter()
        .map(|field| match field {
            None => Cell::Missing,
            Some(text) => match column_type {
                ColumnType::Integer => match text.trim().parse::<i64>() {
                    Ok(value) => Cell::Integer(value),
                    Err(_) => Cell::Text(text),
                },
                ColumnType::Real => match parse_finite(&text) {
                    Some(value) => Cell::Real(value),
                    None => Cell::Text(text),
                },
                ColumnType::Text | ColumnType::Empty => Cell::Text(text),
            },
        })
        .collect();

    Column::new(name, column_type, cells)
}

fn resolve_column_type(fields: &[Option<String>]) -> ColumnType {
    let mut seen_value = false;
    let mut all_integer = true;

    for text in fields.iter().flatten() {
        seen_value = true;
        if all_integer && text.trim().parse::<i64>().is_ok() {
            continue;
        }
        all_integer = false;
        if parse_finite(text).is_none() {
            return ColumnType::Text;
        }
    }

    match (seen_value, all_integer) {
        (false, _) => ColumnType::Empty,
        (true, true) => ColumnType::Integer,
        (true, false) => ColumnType::Real,
    }
}

/// Parses a finite float; "NaN" and "inf" stay text.
fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
