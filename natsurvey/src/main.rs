//! Birth-registry data quality report tool.
//!
//! This binary analyzes a batch of yearly extracts, writes one JSON quality
//! report and prints its executive summary. It reads local files only and
//! terminates when the batch is done.

use anyhow::Context;
use clap::Parser;
use natsurvey::{Cli, collect_inputs, format_summary, output::save_report};
use natsurvey_core::{BatchAnalyzer, init_logging, initialize_report_validator};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.global.verbose, cli.global.quiet)?;

    // Initialize JSON Schema validator
    initialize_report_validator().context("Failed to initialize report validator")?;

    let quality = cli.quality_config();
    quality.validate().context("Invalid quality configuration")?;
    let report_config = cli.report_config();
    report_config.validate().context("Invalid report configuration")?;

    let paths = collect_inputs(&cli.inputs, &cli.prefix, &cli.extension)?;
    if paths.is_empty() {
        warn!("No input files found matching {}*.{}", cli.prefix, cli.extension);
    }
    info!("Starting analysis of {} files", paths.len());

    // The batch is synchronous file work; keep it off the async workers
    let report = tokio::task::spawn_blocking(move || {
        let mut analyzer = BatchAnalyzer::new(quality);
        analyzer.analyze_paths(&paths);
        analyzer.finish(&report_config)
    })
    .await
    .context("Analysis task failed")?;

    info!(
        "Analysis completed: {} files, {} records",
        report.total_files_analyzed, report.summary.total_records_analyzed
    );

    let output_path = cli.output_path();
    save_report(&report, &output_path, cli.compress).await?;
    info!("Report saved to {}", output_path.display());

    if !cli.global.quiet {
        println!("{}", format_summary(&report, &output_path));
    }

    Ok(())
}
