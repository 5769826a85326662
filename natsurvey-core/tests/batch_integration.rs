//! End-to-end batch analysis tests over files on disk.
//!
//! This test suite covers:
//! - Year mismatch, empty column and duplicate detection on real files
//! - Cross-file duplicate groups with their locations
//! - Isolation of unreadable files from the rest of the batch
//! - Encoding fallback and year tokens in file names
//! - Report idempotence and schema validity

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use natsurvey_core::quality::AnalysisStatus;
use natsurvey_core::{
    BatchAnalyzer, QualityConfig, QualityReport, ReportConfig, TextEncoding, analyze_batch,
    discover_sources, initialize_report_validator, validate_report_output,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn fixed_date() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn run(paths: &[PathBuf]) -> QualityReport {
    let mut analyzer = BatchAnalyzer::new(QualityConfig::default());
    analyzer.analyze_paths(paths);
    analyzer.finish_at(&ReportConfig::default(), fixed_date())
}

#[test]
fn test_year_mismatch_detected_from_file_name() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "NAC_1996.csv",
        b"SEXO;DIA_NAC;MES_NAC;ANO_NAC;TIPO_PARTO\n1;1;1;1996;1\n2;2;2;1997;1\n1;3;3;1996;2\n",
    );

    let report = run(&[path]);
    let analysis = report.file("NAC_1996.csv").unwrap();

    assert_eq!(analysis.declared_year.as_deref(), Some("1996"));
    assert_eq!(analysis.anomaly("year_mismatch").unwrap().count(), 1);
    assert_eq!(report.summary.files_with_anomalies, 1);
}

#[test]
fn test_cross_file_duplicate_locations() {
    let dir = TempDir::new().unwrap();
    let mut x = String::from("SEXO;PESO\n");
    for row in 0..5 {
        if row == 3 {
            x.push_str("1;3333\n");
        } else {
            x.push_str(&format!("1;{}\n", 100 + row));
        }
    }
    let mut y = String::from("SEXO;PESO\n");
    for row in 0..8 {
        if row == 7 {
            y.push_str("1;3333\n");
        } else {
            y.push_str(&format!("2;{}\n", 200 + row));
        }
    }
    let x = write(&dir, "NAC_2000.csv", x.as_bytes());
    let y = write(&dir, "NAC_2001.csv", y.as_bytes());

    let report = run(&[x, y]);
    let cross = &report.cross_file_duplicates;

    assert_eq!(cross.total_duplicate_groups, 1);
    assert_eq!(cross.sample_size, 1);
    let locations: Vec<(&str, usize)> = cross.sample_duplicates[0]
        .locations
        .iter()
        .map(|l| (l.file.as_str(), l.row))
        .collect();
    assert_eq!(locations, vec![("NAC_2000.csv", 3), ("NAC_2001.csv", 7)]);

    // not a within-file duplicate in either file
    assert_eq!(report.summary.total_exact_duplicates, 0);
}

#[test]
fn test_corrupt_file_does_not_affect_others() {
    let dir = TempDir::new().unwrap();
    let good_content = b"SEXO;DIA_NAC;MES_NAC;ANO_NAC\n1;1;1;1990\n1;1;1;1990\n2;9;9;1990\n";
    let good = write(&dir, "NAC_1990.csv", good_content);
    let broken = write(&dir, "NAC_1991.csv", b"a;b\n1;2;3\n4,5,6,7\n");
    let empty = write(&dir, "NAC_1992.csv", b"");

    let alone = run(std::slice::from_ref(&good));
    let batch = run(&[good.clone(), broken, empty]);

    assert_eq!(batch.total_files_analyzed, 3);
    for name in ["NAC_1991.csv", "NAC_1992.csv"] {
        let analysis = batch.file(name).unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Unreadable);
        assert!(analysis.errors[0].starts_with("unreadable"));
        assert_eq!(analysis.metrics.total_rows, 0);
        assert!(analysis.read_config.is_none());
    }
    assert_eq!(batch.summary.files_with_errors, 2);

    let good_alone = alone.file("NAC_1990.csv").unwrap();
    let good_batch = batch.file("NAC_1990.csv").unwrap();
    assert_eq!(good_alone, good_batch);
    assert_eq!(good_batch.duplicates.exact_duplicates.count, 1);
    assert_eq!(batch.summary.total_records_analyzed, 3);
}

#[test]
fn test_empty_column_and_null_warning() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "NAC_1995.csv",
        b"ANO_NAC;OBS;DIA_NAC;MES_NAC\n1995;;1;1\n1995;;2;2\n1995;;3;3\n",
    );

    let report = run(&[path]);
    let analysis = report.file("NAC_1995.csv").unwrap();

    match analysis.anomaly("empty_columns").unwrap() {
        natsurvey_core::quality::Anomaly::EmptyColumns { columns, .. } => {
            assert_eq!(columns, &vec!["OBS".to_string()]);
        }
        other => panic!("unexpected anomaly {:?}", other),
    }
    let obs = &analysis.metrics.null_values.columns[1];
    assert_eq!(obs.column, "OBS");
    assert_eq!(obs.count, 3);
    assert_eq!(obs.percentage, 100.0);
    assert!(
        analysis
            .warnings
            .contains(&"Column 'OBS' has 100.00% null values".to_string())
    );
}

#[test]
fn test_latin1_file_falls_back() {
    let dir = TempDir::new().unwrap();
    // "AÑO" in windows-1252
    let path = write(&dir, "NAC_1993.csv", b"A\xD1O;SEXO\n1993;1\n");

    let report = run(&[path]);
    let analysis = report.file("NAC_1993.csv").unwrap();

    assert_eq!(analysis.status, AnalysisStatus::Analyzed);
    assert_eq!(analysis.read_config.unwrap().encoding, TextEncoding::Latin1);
    assert_eq!(analysis.metrics.column_names, vec!["AÑO", "SEXO"]);
}

#[test]
fn test_report_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "NAC_1990.csv", b"SEXO;ANO_NAC\n1;1990\n2;1990\n1;1990\n");
    let b = write(&dir, "NAC_1991.csv", b"SEXO;ANO_NAC\n1;1990\n2;1991\n");

    let first = serde_json::to_string(&run(&[a.clone(), b.clone()])).unwrap();
    let second = serde_json::to_string(&run(&[a.clone(), b.clone()])).unwrap();
    assert_eq!(first, second);

    // with live timestamps, only analysis_date differs
    let report = ReportConfig::default();
    let live = || analyze_batch([&a, &b], QualityConfig::default(), &report);
    let mut left = serde_json::to_value(live()).unwrap();
    let mut right = serde_json::to_value(live()).unwrap();
    left.as_object_mut().unwrap().remove("analysis_date");
    right.as_object_mut().unwrap().remove("analysis_date");
    assert_eq!(left, right);
}

#[test]
fn test_discovered_batch_validates() {
    let dir = TempDir::new().unwrap();
    write(&dir, "NAC_1999.csv", b"SEXO;ANO_NAC\n1;1999\n");
    write(&dir, "NAC_1998.csv", b"SEXO;ANO_NAC\n1;1999\n");
    write(&dir, "NAC_1997.csv", b"");
    write(&dir, "OTHER_1997.csv", b"SEXO\n1\n");
    write(&dir, "NAC_1996.txt", b"SEXO\n1\n");

    let paths = discover_sources(dir.path(), "NAC_", "csv").unwrap();
    assert_eq!(paths.len(), 3);

    let report = run(&paths);
    let json = serde_json::to_string(&report).unwrap();
    let p97 = json.find("\"NAC_1997.csv\":").unwrap();
    let p98 = json.find("\"NAC_1998.csv\":").unwrap();
    let p99 = json.find("\"NAC_1999.csv\":").unwrap();
    assert!(p97 < p98 && p98 < p99);

    // NAC_1998 holds a 1999 birth
    assert_eq!(
        report
            .file("NAC_1998.csv")
            .unwrap()
            .anomaly("year_mismatch")
            .unwrap()
            .count(),
        1
    );
    assert_eq!(report.cross_file_duplicates.total_duplicate_groups, 1);

    initialize_report_validator().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(validate_report_output(&value).is_ok());
}

#[test]
fn test_non_ascii_year_digits_still_validate() {
    let dir = TempDir::new().unwrap();
    let odd = write(&dir, "NAC_\u{661}\u{669}\u{669}\u{666}.csv", b"SEXO;ANO_NAC\n1;1996\n");
    let good = write(&dir, "NAC_1996.csv", b"SEXO;ANO_NAC\n2;1996\n");

    let report = run(&[odd, good]);
    let odd_analysis = report.file("NAC_\u{661}\u{669}\u{669}\u{666}.csv").unwrap();
    assert_eq!(odd_analysis.declared_year, None);
    assert!(
        odd_analysis
            .warnings
            .iter()
            .any(|w| w.starts_with("year_mismatch check skipped"))
    );

    initialize_report_validator().unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
    assert!(validate_report_output(&value).is_ok());
}
