//! FHIR wire/boundary support for CBC Bridge.
//!
//! This crate provides **wire models** and the **bundle builder** for the
//! JSON documents the pipeline emits:
//! - R4 collection bundles (Patient, DiagnosticReport, Observations)
//!   profiled against the NDHM/NRCES national interoperability definitions
//! - the closed LOINC terminology table for the CBC panel
//!
//! This crate focuses on:
//! - FHIR semantic alignment (without FHIR REST transport)
//! - serialisation of bundle documents
//! - translation from [`cbc_types::StructuredReport`] records to resources
//!
//! The builder is usable standalone: it accepts hand-authored records that
//! never went through the parser, so it re-validates analyte keys and
//! re-parses dates instead of trusting upstream normalization.

pub mod bundle;
pub mod resources;
pub mod terminology;

// Re-export facades
pub use bundle::BundleBuilder;

// Re-export wire types
pub use resources::{
    Bundle, BundleEntry, CodeableConcept, Coding, DiagnosticReportResource, HumanName, Identifier,
    Meta, Narrative, ObservationResource, PatientResource, Quantity, Reference, Resource,
};

// Re-export terminology
pub use terminology::{loinc_coding, AnalyteCoding};

/// Errors returned by the `fhir` boundary crate.
///
/// Data-shape defects never surface here — every missing or malformed field
/// degrades to a default during assembly. Only serialising and writing the
/// output document can fail.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("failed to serialise bundle: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
