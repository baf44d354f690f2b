//! Per-document processing and the batch driver.

use crate::constants::{TRANSCRIPT_EXTENSION, TRENDS_FILENAME};
use crate::extract::TextSource;
use crate::trends::TrendTable;
use crate::{PipelineError, PipelineResult};
use cbc_ident::RandomIdGenerator;
use cbc_types::StructuredReport;
use fhir::BundleBuilder;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome counts for one batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents parsed and bundled.
    pub processed: usize,
    /// Documents skipped because no text could be extracted.
    pub skipped: usize,
    /// Documents that failed with an I/O or serialisation error.
    pub failed: usize,
    /// Path of the aggregated trend series, when one was written.
    pub trends: Option<PathBuf>,
}

/// Processes one source document end to end.
///
/// Extracts text, parses it, persists the structured record verbatim as
/// `<stem>.json`, and writes the bundle document, all under `output_dir`.
/// Returns the parsed report for batch accumulation, or `None` when no text
/// could be extracted (logged, not an error).
///
/// # Errors
///
/// Returns [`PipelineError`] for filesystem and serialisation failures only;
/// malformed transcript content never fails, it just parses to an emptier
/// report.
pub fn process_document(
    source: &dyn TextSource,
    input: &Path,
    output_dir: &Path,
) -> PipelineResult<Option<StructuredReport>> {
    let text = source.extract_text(input);
    if text.trim().is_empty() {
        tracing::warn!("no text extracted from {}", input.display());
        return Ok(None);
    }

    let report = cbc_parser::parse(&text);

    let stem = input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("report");
    let record_path = output_dir.join(format!("{stem}.json"));
    let record_json =
        serde_json::to_string_pretty(&report).map_err(PipelineError::RecordSerialization)?;
    fs::write(&record_path, record_json).map_err(PipelineError::RecordWrite)?;

    let bundle_path = BundleBuilder::new(&RandomIdGenerator).write(&report, output_dir)?;
    tracing::info!(
        "wrote {} and {}",
        record_path.display(),
        bundle_path.display()
    );

    Ok(Some(report))
}

/// Processes every transcript in `input_dir`.
///
/// Documents are visited in sorted path order. A failing document is logged
/// and skipped; the batch always runs to completion. Reports that carried at
/// least one recognized analyte are aggregated into a trend series written
/// alongside the per-document output.
///
/// # Errors
///
/// Returns [`PipelineError`] only when the input directory cannot be read,
/// the output directory cannot be created, or the trend series cannot be
/// written. Per-document failures are contained.
pub fn process_directory(
    source: &dyn TextSource,
    input_dir: &Path,
    output_dir: &Path,
) -> PipelineResult<BatchSummary> {
    fs::create_dir_all(output_dir).map_err(PipelineError::OutputDirCreation)?;

    let mut paths: Vec<PathBuf> = fs::read_dir(input_dir)
        .map_err(PipelineError::InputDirRead)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(OsStr::to_str) == Some(TRANSCRIPT_EXTENSION))
        .collect();
    paths.sort();

    let mut summary = BatchSummary::default();
    let mut trended = Vec::new();

    for path in paths {
        tracing::info!("processing {}", path.display());
        match process_document(source, &path, output_dir) {
            Ok(Some(report)) => {
                summary.processed += 1;
                if report.has_analytes() {
                    trended.push(report);
                }
            }
            Ok(None) => summary.skipped += 1,
            Err(error) => {
                tracing::error!("error processing {}: {error}", path.display());
                summary.failed += 1;
            }
        }
    }

    if !trended.is_empty() {
        let table = TrendTable::from_reports(&trended);
        if !table.is_empty() {
            let trends_path = output_dir.join(TRENDS_FILENAME);
            table.write_json(&trends_path)?;
            summary.trends = Some(trends_path);
        }
    }

    Ok(summary)
}
