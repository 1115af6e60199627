// ReconLog - app/pipeline.rs
//
// One function per CLI stage. Each stage takes every path and registry it
// needs as a parameter, reads its inputs one at a time, and writes its
// outputs once.
//
// Error policy:
//   - Multi-source stages skip missing/unreadable sources and report them on
//     the outcome; the rest of the sources are still processed.
//   - Single-source stages treat an unusable input as fatal.
//   - Output write failures are fatal.

use crate::core::aggregate;
use crate::core::export::{self, ColumnMode};
use crate::core::model::{AggregatedTable, Record};
use crate::core::record;
use crate::core::registry::FieldRegistry;
use crate::core::scanner::{self, Sections};
use crate::core::series::{self, ComparisonSeries, SeriesSink};
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{ExportError, ReconLogError, Result, SourceError, UsageError};
use std::io::Write;
use std::path::{Path, PathBuf};

// =============================================================================
// Shared helpers
// =============================================================================

/// Read one declared source fully.
pub fn read_source(path: &Path) -> std::result::Result<String, SourceError> {
    if !path.is_file() {
        return Err(SourceError::Missing {
            path: path.to_path_buf(),
        });
    }
    fs::read_file_lossy(path).map_err(|e| SourceError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Run `write` against a freshly created output file and flush it.
fn write_output<T>(
    path: &Path,
    write: impl FnOnce(&mut dyn Write) -> std::result::Result<T, ExportError>,
) -> Result<T> {
    let mut file = fs::create_output(path).map_err(|e| ReconLogError::Io {
        path: path.to_path_buf(),
        operation: "create output",
        source: e,
    })?;
    let value = write(&mut file as &mut dyn Write)?;
    file.flush().map_err(|e| ReconLogError::Io {
        path: path.to_path_buf(),
        operation: "flush output",
        source: e,
    })?;
    Ok(value)
}

/// Take the first `count` paths, as declared on the command line.
///
/// A count of zero or one larger than the number of paths given is a usage
/// error; nothing is processed in that case. Extra paths are ignored.
pub fn select_declared(count: usize, paths: &[PathBuf]) -> std::result::Result<&[PathBuf], UsageError> {
    if count == 0 || count > paths.len() {
        return Err(UsageError::CountOutOfRange {
            count,
            available: paths.len(),
        });
    }
    if count < paths.len() {
        tracing::warn!(
            count,
            given = paths.len(),
            "More paths than the declared count; extra paths are ignored"
        );
    }
    Ok(&paths[..count])
}

/// Outcome shared by the multi-source stages.
#[derive(Debug)]
pub struct CombineOutcome {
    /// Rows written to the output table.
    pub rows: usize,
    /// Sources that contributed.
    pub parsed: Vec<PathBuf>,
    /// Sources that were declared but skipped.
    pub skipped: Vec<SourceError>,
}

impl CombineOutcome {
    /// True when every declared source contributed.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Process exit code: partial success when any declared source was
    /// skipped.
    pub fn exit_code(&self) -> u8 {
        if self.is_complete() {
            return constants::EXIT_SUCCESS;
        }
        tracing::warn!(
            parsed = self.parsed.len(),
            skipped = self.skipped.len(),
            "Some sources were skipped"
        );
        constants::EXIT_PARTIAL
    }
}

/// Parse each path as a "measure value" file, skipping unusable ones.
fn collect_measure_records(paths: &[PathBuf]) -> (Vec<Record>, Vec<SourceError>) {
    let mut records = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();

    for path in paths {
        match read_source(path) {
            Ok(content) => {
                let record = record::parse_measure_file(&content, path);
                if record.is_empty() {
                    tracing::warn!(path = %path.display(), "No \"measure value\" lines found");
                }
                records.push(record);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping source");
                skipped.push(e);
            }
        }
    }

    (records, skipped)
}

// =============================================================================
// extract-summary
// =============================================================================

/// Inputs and outputs of the single-run extraction stage.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub log: PathBuf,
    pub summary_out: PathBuf,
    pub table_out: PathBuf,
    /// Optional `(calc-volumes input, volumes table output)`.
    pub volumes: Option<(PathBuf, PathBuf)>,
}

/// What the extraction stage produced.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub sections: Sections,
    pub svr_record: Record,
    pub volumes_record: Option<Record>,
}

/// Scan a pipeline log into the summary text, then build the SVR metrics
/// table from that text, and optionally the volumes table from a
/// calc-volumes file.
pub fn extract_summary(
    request: &ExtractRequest,
    svr_registry: &FieldRegistry,
    volumes_registry: &FieldRegistry,
) -> Result<ExtractOutcome> {
    let log = read_source(&request.log)?;
    let sections = scanner::scan_content(&log);
    let summary = sections.render_summary();

    write_output(&request.summary_out, |w| {
        w.write_all(summary.as_bytes())
            .map_err(|e| ExportError::Io {
                path: request.summary_out.clone(),
                source: e,
            })
    })?;
    tracing::info!(
        path = %request.summary_out.display(),
        exclusions = sections.exclusions.len(),
        correlations = sections.correlations.len(),
        metrics = sections.metrics.len(),
        "Summary written"
    );

    // The persisted summary text is the input of the metrics table.
    let svr_record = record::build_record(&summary, &request.summary_out, svr_registry);
    write_output(&request.table_out, |w| {
        export::write_fixed_table(&svr_record, svr_registry, w, &request.table_out)
    })?;
    tracing::info!(path = %request.table_out.display(), "SVR metrics table written");

    let volumes_record = match &request.volumes {
        Some((input, output)) => {
            let content = read_source(input)?;
            let volumes_record = record::build_record(&content, input, volumes_registry);
            write_output(output, |w| {
                export::write_fixed_table(&volumes_record, volumes_registry, w, output)
            })?;
            tracing::info!(path = %output.display(), "Volumes table written");
            Some(volumes_record)
        }
        None => None,
    };

    Ok(ExtractOutcome {
        sections,
        svr_record,
        volumes_record,
    })
}

// =============================================================================
// combine-volumes
// =============================================================================

/// Merge "measure value" files into the wide comparison table.
pub fn combine_volumes(paths: &[PathBuf], output: &Path) -> Result<(AggregatedTable, CombineOutcome)> {
    let (records, skipped) = collect_measure_records(paths);

    let table = aggregate::merge(&records);

    let rows = write_output(output, |w| export::write_wide_table(&table, w, output))?;
    tracing::info!(
        path = %output.display(),
        measures = rows,
        sources = table.source_count(),
        skipped = skipped.len(),
        "Comparison table written"
    );

    let outcome = CombineOutcome {
        rows,
        parsed: table.sources().to_vec(),
        skipped,
    };
    Ok((table, outcome))
}

// =============================================================================
// combine-results
// =============================================================================

/// Write one row per "measure value" file, keyed by its path.
pub fn combine_results(paths: &[PathBuf], output: &Path, mode: ColumnMode) -> Result<CombineOutcome> {
    let (records, skipped) = collect_measure_records(paths);
    if records.is_empty() {
        tracing::warn!("No source could be read; writing header only");
    }

    let rows = write_output(output, |w| {
        export::write_combined_records(&records, mode, w, output)
    })?;
    tracing::info!(
        path = %output.display(),
        rows,
        ?mode,
        skipped = skipped.len(),
        "Combined records written"
    );

    Ok(CombineOutcome {
        rows,
        parsed: records.iter().map(|r| r.source().to_path_buf()).collect(),
        skipped,
    })
}

// =============================================================================
// series
// =============================================================================

/// Writes each series as `<measure>_volume_comparison.json` in a directory.
#[derive(Debug)]
pub struct DirectorySeriesSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySeriesSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl SeriesSink for DirectorySeriesSink {
    fn accept(&mut self, s: &ComparisonSeries) -> std::result::Result<(), ExportError> {
        let path = self.dir.join(series::series_file_name(&s.measure));
        let io_err = |e: std::io::Error| ExportError::Io {
            path: path.clone(),
            source: e,
        };
        let mut file = fs::create_output(&path).map_err(io_err)?;
        series::write_series_json(s, &mut file, &path)?;
        file.flush().map_err(io_err)?;
        self.written.push(path);
        Ok(())
    }
}

/// Read the wide comparison table and hand one series per measure to the
/// charting sink.
pub fn export_series(input: &Path, sink: &mut dyn SeriesSink) -> Result<usize> {
    let content = read_source(input)?;
    let all = series::read_wide_table(content.as_bytes(), input)?;
    let count = series::publish(&all, sink)?;
    tracing::info!(path = %input.display(), series = count, "Series exported");
    Ok(count)
}
