//! Wire models for the emitted bundle document.
//!
//! These structs are the exact JSON shape written to disk: a top-level
//! collection [`Bundle`] whose entries each wrap one [`Resource`]. Field
//! names follow the FHIR R4 JSON conventions (`resourceType`,
//! `effectiveDateTime`, `birthDate`, ...) via serde renames.
//!
//! The models are output-first — they exist to serialise faithfully, not to
//! validate arbitrary inbound documents — but they round-trip through serde
//! so tests can re-read what the builder wrote.

use serde::{Deserialize, Serialize};

/// Top-level bundle document: `{resourceType: "Bundle", type: "collection"}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bundle {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: String,

    pub entry: Vec<BundleEntry>,
}

/// One bundle entry wrapping a single resource.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BundleEntry {
    pub resource: Resource,
}

/// A typed clinical resource, discriminated by `resourceType` on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Patient(PatientResource),
    DiagnosticReport(DiagnosticReportResource),
    Observation(ObservationResource),
}

impl Resource {
    /// Returns the resource-local id.
    pub fn id(&self) -> &str {
        match self {
            Resource::Patient(patient) => &patient.id,
            Resource::DiagnosticReport(report) => &report.id,
            Resource::Observation(observation) => &observation.id,
        }
    }
}

/// Patient demographics resource.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientResource {
    pub identifier: Vec<Identifier>,
    pub id: String,
    pub meta: Meta,
    pub text: Narrative,
    pub name: Vec<HumanName>,
    pub gender: String,
    #[serde(rename = "birthDate")]
    pub birth_date: String,
}

/// Diagnostic report resource referencing the panel's observations.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticReportResource {
    pub id: String,
    pub meta: Meta,
    pub text: Narrative,
    pub status: String,
    pub code: CodeableConcept,
    pub subject: Reference,
    #[serde(rename = "effectiveDateTime")]
    pub effective_date_time: String,
    pub issued: String,
    pub result: Vec<Reference>,
}

/// One coded analyte measurement.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ObservationResource {
    pub id: String,
    pub meta: Meta,
    pub text: Narrative,
    pub status: String,
    pub category: Vec<CodeableConcept>,
    pub code: CodeableConcept,
    pub subject: Reference,
    #[serde(rename = "effectiveDateTime")]
    pub effective_date_time: String,
    #[serde(rename = "valueQuantity")]
    pub value_quantity: Quantity,
}

/// Profile metadata carried by every resource.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    pub profile: Vec<String>,
}

/// Generated human-readable narrative.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Narrative {
    pub status: String,
    pub div: String,
}

/// One coding from a terminology system.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: String,
}

/// A concept expressed as one or more codings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A quantity with its UCUM unit.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
    pub system: String,
}

/// An intra-bundle resource reference, e.g. `Patient/abc123`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    pub reference: String,
}

/// External identifier block (system + value).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Identifier {
    pub system: String,
    pub value: String,
}

/// Free-text human name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HumanName {
    pub text: String,
}
