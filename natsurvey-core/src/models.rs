//! Tabular data models shared by the loader, hasher and profiler.
//!
//! A [`ParsedTable`] is the in-memory result of one successful load. It is
//! owned by a single file's analysis and dropped once that file has been
//! hashed and profiled.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{NatSurveyError, Result};

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty field
    Missing,
    /// Value of an integer-typed column
    Integer(i64),
    /// Value of a real-typed column
    Real(f64),
    /// Value of a text-typed column
    Text(String),
}

impl Cell {
    /// Returns true for [`Cell::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Canonical text form used for hashing and text comparison.
    ///
    /// Returns `None` for missing cells; callers pick their own sentinel.
    pub fn canonical_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Missing => None,
            Cell::Integer(v) => Some(Cow::Owned(v.to_string())),
            // Debug keeps a fractional part ("3.0") and is round-trip exact
            Cell::Real(v) => Some(Cow::Owned(format!("{:?}", v))),
            Cell::Text(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }

    /// Numeric value for integer and real cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Real(v) => Some(*v),
            Cell::Missing | Cell::Text(_) => None,
        }
    }

    /// Heap bytes owned by this cell beyond its inline size.
    fn heap_bytes(&self) -> usize {
        match self {
            Cell::Text(s) => s.capacity(),
            _ => 0,
        }
    }
}

/// Column value type resolved once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every non-missing field parsed as a 64-bit integer
    Integer,
    /// Every non-missing field parsed as a finite float
    Real,
    /// At least one field was not numeric
    Text,
    /// No non-missing fields at all
    Empty,
}

impl ColumnType {
    /// Stable lowercase name, as used in the report.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Empty => "empty",
        }
    }

    /// Whether range checks can compare this column's cells.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Real)
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub cells: Vec<Cell>,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<String>, column_type: ColumnType, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            column_type,
            cells,
        }
    }

    /// Number of missing cells.
    pub fn null_count(&self) -> u64 {
        self.cells.iter().filter(|c| c.is_missing()).count() as u64
    }
}

/// In-memory result of a successful load.
///
/// # Invariant
/// Every column has exactly `row_count` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    columns: Vec<Column>,
    row_count: usize,
    index: HashMap<String, usize>,
}

impl ParsedTable {
    /// Builds a table, rejecting columns of unequal length.
    ///
    /// When two columns share a name, lookups by name resolve to the first.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, |c| c.cells.len());

        if let Some(bad) = columns.iter().find(|c| c.cells.len() != row_count) {
            return Err(NatSurveyError::invariant(format!(
                "column '{}' has {} cells, expected {}",
                bad.name,
                bad.cells.len(),
                row_count
            )));
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            index.entry(column.name.clone()).or_insert(position);
        }

        Ok(Self {
            columns,
            row_count,
            index,
        })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in file order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// Cells of one row in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.columns.iter().filter_map(move |c| c.cells.get(row))
    }

    /// Approximate in-memory footprint in bytes.
    pub fn memory_estimate_bytes(&self) -> u64 {
        let cell_size = std::mem::size_of::<Cell>();
        let total: usize = self
            .columns
            .iter()
            .map(|c| {
                c.name.capacity()
                    + c.cells.len() * cell_size
                    + c.cells.iter().map(Cell::heap_bytes).sum::<usize>()
            })
            .sum();
        total as u64
    }
}

/// Field delimiter of a read configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delimiter {
    #[serde(rename = ";")]
    Semicolon,
    #[serde(rename = ",")]
    Comma,
}

impl Delimiter {
    /// Delimiter byte for the csv reader.
    pub fn byte(&self) -> u8 {
        match self {
            Delimiter::Semicolon => b';',
            Delimiter::Comma => b',',
        }
    }
}

/// Text encoding of a read configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
}

impl TextEncoding {
    /// Name used in the report and in log messages.
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Iso8859_1 => "iso-8859-1",
        }
    }

    /// The `encoding_rs` decoder. Both Latin encodings resolve to
    /// windows-1252, as WHATWG browsers do.
    pub fn decoder(&self) -> &'static encoding_rs::Encoding {
        match self {
            TextEncoding::Utf8 => encoding_rs::UTF_8,
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => encoding_rs::WINDOWS_1252,
        }
    }
}

/// Quote handling of a read configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotingMode {
    /// `"` quotes fields
    Minimal,
    /// Quote characters are literal text
    None,
}

/// One (delimiter, encoding, quoting) combination the loader can try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadConfig {
    pub delimiter: Delimiter,
    pub encoding: TextEncoding,
    pub quoting: QuotingMode,
}

impl ReadConfig {
    /// Creates a read configuration.
    pub const fn new(delimiter: Delimiter, encoding: TextEncoding, quoting: QuotingMode) -> Self {
        Self {
            delimiter,
            encoding,
            quoting,
        }
    }
}

impl std::fmt::Display for ReadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let quoting = match self.quoting {
            QuotingMode::Minimal => "quoted",
            QuotingMode::None => "unquoted",
        };
        write!(
            f,
            "'{}' {} {}",
            char::from(self.delimiter.byte()),
            self.encoding.label(),
            quoting
        )
    }
}
