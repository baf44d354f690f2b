//! # CBC Core
//!
//! Pipeline orchestration for the CBC Bridge system.
//!
//! This crate wires the parser and the bundle builder into a per-document
//! pipeline and a batch driver:
//! - Text extraction behind the [`TextSource`] seam (OCR stays outside)
//! - Per-document processing: extract, parse, persist the structured
//!   record, emit the bundle document
//! - Batch iteration with per-document error containment
//! - Trend aggregation across a batch of parsed reports
//!
//! **No CLI concerns**: argument handling and subscriber installation
//! belong in `cbc-cli`.

pub mod constants;
pub mod extract;
pub mod pipeline;
pub mod trends;

pub use extract::{PlainTextSource, TextSource};
pub use pipeline::{process_directory, process_document, BatchSummary};
pub use trends::{TrendPoint, TrendTable};

/// Errors that can occur while running the pipeline.
///
/// Parsing never fails; these are the filesystem and serialisation failures
/// around it. The batch driver catches them per document and continues.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read input directory: {0}")]
    InputDirRead(std::io::Error),
    #[error("failed to create output directory: {0}")]
    OutputDirCreation(std::io::Error),
    #[error("failed to serialize report record: {0}")]
    RecordSerialization(serde_json::Error),
    #[error("failed to write report record: {0}")]
    RecordWrite(std::io::Error),
    #[error("failed to write bundle document: {0}")]
    Bundle(#[from] fhir::FhirError),
    #[error("failed to serialize trend series: {0}")]
    TrendSerialization(serde_json::Error),
    #[error("failed to write trend series: {0}")]
    TrendWrite(std::io::Error),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
