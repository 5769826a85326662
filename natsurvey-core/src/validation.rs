//! JSON Schema validation for the quality report format.
//!
//! The report is checked against an embedded JSON Schema before it is
//! written, so a malformed report never reaches disk. The format version is
//! checked first, giving a clear error for reports from another release.
//!
//! # Example
//! ```rust,ignore
//! use natsurvey_core::validation::{initialize_report_validator, validate_report_output};
//!
//! initialize_report_validator()?;
//! let json_value = serde_json::to_value(&report)?;
//! validate_report_output(&json_value)?;
//! ```

use jsonschema::Validator;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// Report validation errors with detailed field-level reporting
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema compilation failed during initialization
    #[error("JSON Schema compilation failed: {message}")]
    SchemaCompilation { message: String },

    /// Validation failed with specific field errors
    #[error("Report validation failed with {error_count} errors: {errors:?}")]
    ValidationFailed {
        error_count: usize,
        errors: Vec<String>,
    },

    /// Unsupported format version detected
    #[error("Unsupported format version '{version}'. Supported versions: {supported:?}")]
    UnsupportedVersion {
        version: String,
        supported: Vec<String>,
    },

    /// JSON parsing error
    #[error("JSON parsing failed: {source}")]
    JsonParsing {
        #[from]
        source: serde_json::Error,
    },
}

/// Supported report format versions
const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Embedded JSON Schema for report format v1.0
const SCHEMA_V1_0: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "NatSurvey Quality Report Format v1.0",
  "type": "object",
  "required": [
    "format_version",
    "tool_version",
    "analysis_date",
    "total_files_analyzed",
    "individual_file_analysis",
    "cross_file_duplicates",
    "summary"
  ],
  "properties": {
    "format_version": { "type": "string", "pattern": "^1\\.0$" },
    "tool_version": { "type": "string", "minLength": 1 },
    "analysis_date": { "type": "string", "format": "date-time" },
    "total_files_analyzed": { "type": "integer", "minimum": 0 },
    "individual_file_analysis": {
      "type": "object",
      "additionalProperties": { "$ref": "#/$defs/file_analysis" }
    },
    "cross_file_duplicates": {
      "type": "object",
      "required": ["total_duplicate_groups", "sample_size", "sample_duplicates"],
      "properties": {
        "total_duplicate_groups": { "type": "integer", "minimum": 0 },
        "sample_size": { "type": "integer", "minimum": 0 },
        "sample_duplicates": { "type": "array", "items": { "$ref": "#/$defs/duplicate_group" } },
        "all_groups": { "type": "array", "items": { "$ref": "#/$defs/duplicate_group" } }
      }
    },
    "summary": {
      "type": "object",
      "required": [
        "total_records_analyzed",
        "total_exact_duplicates",
        "total_key_column_duplicates",
        "files_with_anomalies",
        "files_with_errors",
        "average_file_size_bytes",
        "average_file_size_mb",
        "suspicious_files"
      ],
      "properties": {
        "total_records_analyzed": { "type": "integer", "minimum": 0 },
        "total_exact_duplicates": { "type": "integer", "minimum": 0 },
        "total_key_column_duplicates": { "type": "integer", "minimum": 0 },
        "files_with_anomalies": { "type": "integer", "minimum": 0 },
        "files_with_errors": { "type": "integer", "minimum": 0 },
        "average_file_size_bytes": { "type": "number", "minimum": 0 },
        "average_file_size_mb": { "type": "number", "minimum": 0 },
        "suspicious_files": {
          "type": "array",
          "items": {
            "type": "object",
            "required": ["file", "size_bytes", "size_mb", "rows"],
            "properties": {
              "file": { "type": "string", "minLength": 1 },
              "size_bytes": { "type": "integer", "minimum": 0 },
              "size_mb": { "type": "number", "minimum": 0 },
              "rows": { "type": "integer", "minimum": 0 }
            }
          }
        }
      }
    }
  },
  "$defs": {
    "percentage": { "type": "number", "minimum": 0, "maximum": 100 },
    "duplicate_group": {
      "type": "object",
      "required": ["hash", "file_count", "locations"],
      "properties": {
        "hash": { "type": "string", "pattern": "^[0-9a-f]{64}$" },
        "file_count": { "type": "integer", "minimum": 2 },
        "locations": {
          "type": "array",
          "minItems": 2,
          "items": {
            "type": "object",
            "required": ["file", "row"],
            "properties": {
              "file": { "type": "string" },
              "row": { "type": "integer", "minimum": 0 }
            }
          }
        }
      }
    },
    "read_config": {
      "type": "object",
      "required": ["delimiter", "encoding", "quoting"],
      "properties": {
        "delimiter": { "enum": [";", ","] },
        "encoding": { "enum": ["utf-8", "latin-1", "iso-8859-1"] },
        "quoting": { "enum": ["minimal", "none"] }
      }
    },
    "anomaly": {
      "type": "object",
      "required": ["type", "description"],
      "properties": {
        "type": {
          "enum": ["year_mismatch", "invalid_day", "invalid_month", "empty_rows", "empty_columns"]
        },
        "description": { "type": "string" },
        "expected_year": { "type": "string", "pattern": "^[0-9]{4}$" },
        "count": { "type": "integer", "minimum": 1 },
        "percentage": { "$ref": "#/$defs/percentage" },
        "columns": { "type": "array", "minItems": 1, "items": { "type": "string" } }
      }
    },
    "file_analysis": {
      "type": "object",
      "required": [
        "file_name",
        "file_size_bytes",
        "file_size_mb",
        "status",
        "metrics",
        "duplicates",
        "anomalies",
        "warnings",
        "errors"
      ],
      "properties": {
        "file_name": { "type": "string", "minLength": 1 },
        "file_size_bytes": { "type": "integer", "minimum": 0 },
        "file_size_mb": { "type": "number", "minimum": 0 },
        "declared_year": { "type": ["string", "null"] },
        "status": { "enum": ["analyzed", "unreadable", "failed"] },
        "read_config": {
          "oneOf": [{ "type": "null" }, { "$ref": "#/$defs/read_config" }]
        },
        "metrics": {
          "type": "object",
          "required": ["total_rows", "total_columns", "column_names", "null_values", "data_types"],
          "properties": {
            "total_rows": { "type": "integer", "minimum": 0 },
            "total_columns": { "type": "integer", "minimum": 0 },
            "column_names": { "type": "array", "items": { "type": "string" } },
            "memory_estimate_bytes": { "type": "integer", "minimum": 0 },
            "null_values": {
              "type": "object",
              "required": ["total_nulls", "columns"],
              "properties": {
                "total_nulls": { "type": "integer", "minimum": 0 },
                "columns": {
                  "type": "array",
                  "items": {
                    "type": "object",
                    "required": ["column", "count", "percentage"],
                    "properties": {
                      "column": { "type": "string" },
                      "count": { "type": "integer", "minimum": 0 },
                      "percentage": { "$ref": "#/$defs/percentage" }
                    }
                  }
                }
              }
            },
            "data_types": {
              "type": "object",
              "propertyNames": { "enum": ["integer", "real", "text", "empty"] },
              "additionalProperties": { "type": "integer", "minimum": 0 }
            },
            "consistency": {
              "type": "array",
              "items": {
                "type": "object",
                "required": ["column", "unique_values", "value_counts"],
                "properties": {
                  "column": { "type": "string" },
                  "unique_values": { "type": "integer", "minimum": 0 },
                  "value_counts": {
                    "type": "object",
                    "additionalProperties": { "type": "integer", "minimum": 1 }
                  }
                }
              }
            },
            "row_hashes_created": { "type": "integer", "minimum": 0 }
          }
        },
        "duplicates": {
          "type": "object",
          "required": ["exact_duplicates"],
          "properties": {
            "exact_duplicates": {
              "type": "object",
              "required": ["count", "percentage"],
              "properties": {
                "count": { "type": "integer", "minimum": 0 },
                "percentage": { "$ref": "#/$defs/percentage" }
              }
            },
            "key_column_duplicates": {
              "type": "object",
              "required": ["columns", "count", "percentage"],
              "properties": {
                "columns": { "type": "array", "minItems": 1, "items": { "type": "string" } },
                "count": { "type": "integer", "minimum": 0 },
                "percentage": { "$ref": "#/$defs/percentage" }
              }
            }
          }
        },
        "anomalies": { "type": "array", "items": { "$ref": "#/$defs/anomaly" } },
        "warnings": { "type": "array", "items": { "type": "string" } },
        "errors": { "type": "array", "items": { "type": "string" } }
      }
    }
  }
}"##;

/// Compiled JSON Schema instance (initialized once)
static COMPILED_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Initialize and compile the report JSON Schema
///
/// Compiles the embedded schema and caches it for reuse. Call it once
/// during startup; repeated calls are harmless.
///
/// # Errors
/// Returns `ValidationError::SchemaCompilation` if the embedded schema is invalid.
pub fn initialize_report_validator() -> Result<(), ValidationError> {
    let schema_json = get_report_schema()?;

    let compiled = jsonschema::validator_for(&schema_json).map_err(|e| {
        ValidationError::SchemaCompilation {
            message: format!("Schema compilation error: {}", e),
        }
    })?;

    // Already set by an earlier call
    let _ = COMPILED_SCHEMA.set(compiled);

    Ok(())
}

/// Validate a serialized quality report
///
/// Checks the format version, then every schema violation; all schema
/// errors are collected rather than only the first.
///
/// # Errors
/// Returns `UnsupportedVersion` for a foreign format version and
/// `ValidationFailed` listing each violation.
pub fn validate_report_output(json_value: &Value) -> Result<(), ValidationError> {
    let schema = COMPILED_SCHEMA
        .get()
        .ok_or_else(|| ValidationError::SchemaCompilation {
            message: "Report validator not initialized. Call initialize_report_validator() first."
                .to_string(),
        })?;

    validate_format_version(json_value)?;

    let errors: Vec<String> = schema
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();

    if !errors.is_empty() {
        return Err(ValidationError::ValidationFailed {
            error_count: errors.len(),
            errors,
        });
    }

    Ok(())
}

/// Validate format version compatibility
fn validate_format_version(json_value: &Value) -> Result<(), ValidationError> {
    let version = json_value
        .get("format_version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ValidationError::ValidationFailed {
            error_count: 1,
            errors: vec!["Missing required field 'format_version'".to_string()],
        })?;

    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ValidationError::UnsupportedVersion {
            version: version.to_string(),
            supported: SUPPORTED_VERSIONS.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(())
}

/// Parse a report from text and validate it
///
/// # Errors
/// Returns `JsonParsing` for malformed JSON and the errors of
/// [`validate_report_output`] otherwise.
pub fn validate_report_str(json_str: &str) -> Result<Value, ValidationError> {
    let json_value: Value = serde_json::from_str(json_str)?;
    validate_report_output(&json_value)?;
    Ok(json_value)
}

/// Get the embedded JSON Schema as a parsed Value
///
/// # Example
/// ```rust
/// let schema = natsurvey_core::validation::get_report_schema().unwrap();
/// assert_eq!(schema["properties"]["format_version"]["type"], "string");
/// ```
pub fn get_report_schema() -> Result<Value, ValidationError> {
    serde_json::from_str(SCHEMA_V1_0).map_err(|e| ValidationError::SchemaCompilation {
        message: format!("Failed to parse embedded schema: {}", e),
    })
}
