//! Source file identity and directory discovery.
//!
//! Files follow the `PREFIX_<year>.<ext>` convention (for example
//! `NAC_1996.csv`). The year token drives the year-mismatch check; a name
//! without one is still analyzed, just without that check.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{NatSurveyError, Result};

static YEAR_TOKEN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$"));

/// A discovered input file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name, the file's identity in the report
    pub name: String,
    /// Full path as given at discovery
    pub path: PathBuf,
    /// Size on disk in bytes
    pub size_bytes: u64,
    /// Four-digit year token parsed from the name, if any
    pub declared_year: Option<String>,
}

impl SourceFile {
    /// Builds a source file from already-known attributes.
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let declared_year = parse_year_token(&name);
        Self {
            name,
            path,
            size_bytes,
            declared_year,
        }
    }

    /// Stats `path` and builds its source file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| NatSurveyError::io(format!("Failed to stat {}", path.display()), e))?;
        Ok(Self::new(path, metadata.len()))
    }
}

/// Extracts the year token from a file name.
///
/// The extension is stripped and the stem split on `_`; the first token
/// after the prefix that is exactly four ASCII digits is the year.
pub fn parse_year_token(file_name: &str) -> Option<String> {
    let pattern = YEAR_TOKEN.as_ref().ok()?;
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _ext)| stem);

    stem.split('_')
        .skip(1)
        .find(|token| pattern.is_match(token))
        .map(str::to_string)
}

/// Lists the files in `dir` named `<prefix>*.<extension>`, sorted by name.
pub fn discover_sources(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| NatSurveyError::io(format!("Failed to list {}", dir.display()), e))?;

    let suffix = format!(".{}", extension);
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| NatSurveyError::io(format!("Failed to list {}", dir.display()), e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::debug!("Skipping non UTF-8 file name in {}", dir.display());
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(&suffix) {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    tracing::debug!("Discovered {} source files in {}", paths.len(), dir.display());
    Ok(paths)
}
