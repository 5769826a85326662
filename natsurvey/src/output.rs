//! File output operations for quality reports.
//!
//! Handles serializing, validating and writing the report, with optional
//! Zstandard compression.

use std::path::Path;

use natsurvey_core::{NatSurveyError, QualityReport, Result, validate_report_output};

/// Serializes `report` as pretty JSON.
///
/// The serializer streams fields in declaration order, so per-file entries
/// keep discovery order in the output.
///
/// # Errors
///
/// Returns a serialization error if the report cannot be encoded.
pub fn render_report(report: &QualityReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| NatSurveyError::serialization("JSON serialization", e))
}

/// Validates and writes the report, compressed when `compress` is set.
///
/// # Errors
///
/// Returns an error if serialization, validation or the write fails.
pub async fn save_report(report: &QualityReport, output_path: &Path, compress: bool) -> Result<()> {
    let json_data = render_report(report)?;

    // Validate output against JSON Schema before saving
    let json_value: serde_json::Value = serde_json::from_str(&json_data)
        .map_err(|e| NatSurveyError::serialization("JSON parsing for validation", e))?;
    validate_report_output(&json_value)
        .map_err(|e| NatSurveyError::configuration(format!("Report validation failed: {e}")))?;

    tracing::info!("Output validation passed");

    if compress {
        #[cfg(feature = "compression")]
        {
            save_compressed(&json_data, output_path).await
        }
        #[cfg(not(feature = "compression"))]
        {
            Err(NatSurveyError::configuration(
                "Compression not available. Compile with --features compression",
            ))
        }
    } else {
        save_json(&json_data, output_path).await
    }
}

/// Saves JSON data to file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub async fn save_json(json_data: &str, output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, json_data)
        .await
        .map_err(|e| {
            NatSurveyError::io(format!("Failed to write to {}", output_path.display()), e)
        })?;
    Ok(())
}

/// Saves compressed JSON data.
#[cfg(feature = "compression")]
async fn save_compressed(json_data: &str, output_path: &Path) -> Result<()> {
    use std::io::Write;

    let mut encoder = zstd::Encoder::new(Vec::new(), 3).map_err(|e| {
        NatSurveyError::configuration(format!("Failed to create compressor: {e}"))
    })?;

    encoder
        .write_all(json_data.as_bytes())
        .map_err(|e| NatSurveyError::configuration(format!("Compression failed: {e}")))?;

    let compressed_data = encoder.finish().map_err(|e| {
        NatSurveyError::configuration(format!("Compression finalization failed: {e}"))
    })?;

    tokio::fs::write(output_path, compressed_data)
        .await
        .map_err(|e| {
            NatSurveyError::io(
                format!(
                    "Failed to write compressed file to {}",
                    output_path.display()
                ),
                e,
            )
        })?;

    Ok(())
}
