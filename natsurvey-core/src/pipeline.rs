//! Batch orchestration.
//!
//! Files are processed one at a time in the order given. For each file the
//! table is loaded, hashed and profiled, its row hashes are handed to the
//! [`CrossFileIndex`], and the table is dropped before the next file is
//! read. A failing file is recorded and the batch continues.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::hashing::{FileId, hash_table};
use crate::index::CrossFileIndex;
use crate::loader::{LoadFailure, TableLoader};
use crate::quality::{AnalysisStatus, FileAnalysis, FileProfiler, QualityConfig, ReportConfig};
use crate::report::{FileEntry, QualityReport, ReportAggregator};
use crate::source::SourceFile;

/// Runs the load, hash and profile steps over a batch of files.
#[derive(Debug, Default)]
pub struct BatchAnalyzer {
    loader: TableLoader,
    profiler: FileProfiler,
    index: CrossFileIndex,
    entries: Vec<FileEntry>,
    seen_names: HashSet<String>,
}

impl BatchAnalyzer {
    /// Creates an analyzer with the default loader.
    pub fn new(config: QualityConfig) -> Self {
        Self::with_loader(TableLoader::default(), config)
    }

    /// Creates an analyzer with a custom loader.
    pub fn with_loader(loader: TableLoader, config: QualityConfig) -> Self {
        Self {
            loader,
            profiler: FileProfiler::new(config),
            index: CrossFileIndex::new(),
            entries: Vec::new(),
            seen_names: HashSet::new(),
        }
    }

    /// Analyzes one file and records its result.
    ///
    /// Never fails: stat and load errors are recorded on the file's
    /// analysis.
    pub fn analyze_path(&mut self, path: &Path) -> &FileAnalysis {
        let file = FileId(self.entries.len());
        tracing::info!("Analyzing {} ({} of batch)", path.display(), file.0 + 1);

        let analysis = match SourceFile::from_path(path) {
            Ok(source) => self.analyze_source(file, &source),
            Err(e) => {
                tracing::warn!("Skipping analysis of {}: {}", path.display(), e);
                FileAnalysis::failed(&SourceFile::new(path, 0), e)
            }
        };

        self.push_entry(path, analysis)
    }

    /// Analyzes every path in order.
    pub fn analyze_paths<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.analyze_path(path.as_ref());
        }
    }

    fn analyze_source(&mut self, file: FileId, source: &SourceFile) -> FileAnalysis {
        let loaded = match self.loader.load(&source.path) {
            Ok(loaded) => loaded,
            // The file was stat'ed but its bytes could not be read
            Err(LoadFailure::Io { source: e, .. }) => {
                tracing::error!("Failed to read {}: {}", source.path.display(), e);
                return FileAnalysis::failed(
                    source,
                    format_args!("failed to read {}: {}", source.path.display(), e),
                );
            }
            Err(e) => return FileAnalysis::unreadable(source, e.to_string()),
        };

        let hashes = hash_table(file, &loaded.table);
        let analysis = self.profiler.profile_hashed(source, &loaded, &hashes);
        if analysis.status == AnalysisStatus::Analyzed {
            self.index.record(hashes);
        }
        // `loaded` is dropped here; only the digests outlive this call
        analysis
    }

    fn push_entry(&mut self, path: &Path, mut analysis: FileAnalysis) -> &FileAnalysis {
        let key = if self.seen_names.insert(analysis.file_name.clone()) {
            analysis.file_name.clone()
        } else {
            let key = path.display().to_string();
            tracing::warn!("Duplicate file name {}, keyed as {}", analysis.file_name, key);
            analysis.warnings.push(format!(
                "Duplicate file name {} in batch; keyed by full path",
                analysis.file_name
            ));
            key
        };

        let index = self.entries.len();
        self.entries.push(FileEntry { key, analysis });
        &self.entries[index].analysis
    }

    /// Analyses recorded so far, in processing order.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// The cross-file index accumulated so far.
    pub fn index(&self) -> &CrossFileIndex {
        &self.index
    }

    /// Finalizes the index and aggregates the report.
    pub fn finish(self, config: &ReportConfig) -> QualityReport {
        self.finish_at(config, Utc::now())
    }

    /// Same as [`finish`](Self::finish) with an explicit analysis date.
    pub fn finish_at(self, config: &ReportConfig, analysis_date: DateTime<Utc>) -> QualityReport {
        let groups = self.index.finalize();
        ReportAggregator::new(config.clone()).aggregate_at(self.entries, groups, analysis_date)
    }
}

/// Analyzes `paths` and aggregates the report in one call.
pub fn analyze_batch<I, P>(
    paths: I,
    quality: QualityConfig,
    report: &ReportConfig,
) -> QualityReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut analyzer = BatchAnalyzer::new(quality);
    analyzer.analyze_paths(paths);
    analyzer.finish(report)
}
