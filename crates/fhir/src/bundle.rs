//! Assembly of bundle documents from structured report records.
//!
//! [`BundleBuilder`] maps one [`StructuredReport`] onto a collection bundle:
//! one Patient, one DiagnosticReport, and one Observation per
//! terminology-mapped analyte, cross-referenced by freshly generated ids.
//! Missing report fields degrade to defaults; nothing short of an I/O
//! failure while writing the document can make a build fail.

use crate::resources::{
    Bundle, BundleEntry, CodeableConcept, Coding, DiagnosticReportResource, HumanName, Identifier,
    Meta, Narrative, ObservationResource, PatientResource, Quantity, Reference, Resource,
};
use crate::terminology::{
    self, AnalyteCoding, CBC_PANEL_CODE, CBC_PANEL_DISPLAY, DIAGNOSTIC_REPORT_PROFILE,
    HEALTH_ID_SYSTEM, LABORATORY_CATEGORY_CODE, LABORATORY_CATEGORY_DISPLAY, LOINC_SYSTEM,
    OBSERVATION_CATEGORY_SYSTEM, OBSERVATION_PROFILE, PATIENT_PROFILE, UCUM_SYSTEM,
};
use crate::FhirResult;
use cbc_ident::{sanitize_identifier, IdGenerator};
use cbc_types::StructuredReport;
use chrono::{Datelike, Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered fallback chain for the report date. The first form is the
/// parser's canonical output; the second covers hand-authored records that
/// kept the printed day-first form. Anything else falls through to the
/// current date.
const EFFECTIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];

/// Fixed local-time rendering of the issued instant. The offset is a
/// profile convention, not derived from any real timezone source.
const ISSUED_TIME_SUFFIX: &str = "T15:00:00+05:30";

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Builds bundle documents from structured reports.
///
/// Identifier generation is an injected capability so tests can substitute
/// a deterministic generator; every build call mints fresh ids and never
/// reuses or looks up identifiers across calls.
pub struct BundleBuilder<'a> {
    ids: &'a dyn IdGenerator,
}

/// Everything one build call resolves, including the pieces the file name
/// is derived from.
struct Assembled {
    bundle: Bundle,
    patient_id: String,
    effective: NaiveDate,
}

impl<'a> BundleBuilder<'a> {
    /// Creates a builder drawing identifiers from `ids`.
    pub fn new(ids: &'a dyn IdGenerator) -> Self {
        Self { ids }
    }

    /// Assembles the bundle for `report` without touching the filesystem.
    pub fn build(&self, report: &StructuredReport) -> Bundle {
        self.assemble(report).bundle
    }

    /// Assembles the bundle and writes it under `dest_dir`.
    ///
    /// The file name is derived deterministically from the resolved patient
    /// identifier and effective date: `bundle_<patientId>_<YYYYMMDD>.json`.
    /// Two reports resolving to the same identifier and date therefore race
    /// on the same path; batch callers serialise such writes themselves.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError`] only for serialisation or I/O failures;
    /// data-shape defects are absorbed by defaulting.
    pub fn write(&self, report: &StructuredReport, dest_dir: &Path) -> FhirResult<PathBuf> {
        let Assembled {
            bundle,
            patient_id,
            effective,
        } = self.assemble(report);

        let file_name = format!("bundle_{}_{}.json", patient_id, effective.format("%Y%m%d"));
        let path = dest_dir.join(file_name);
        let json = serde_json::to_string_pretty(&bundle)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    fn assemble(&self, report: &StructuredReport) -> Assembled {
        let effective = effective_date(report.report_date.as_deref());
        let effective_text = effective.format("%Y-%m-%d").to_string();
        let patient_id = self.resolve_patient_id(report.patient_id.as_deref());

        let mut observations = Vec::new();
        for (key, value) in &report.analytes {
            // The parser already guarantees the closed vocabulary, but the
            // builder also accepts hand-authored records, so unmapped keys
            // are re-checked and skipped here as well.
            let Some(coding) = terminology::loinc_coding(*key) else {
                continue;
            };
            observations.push(self.observation(coding, *value, &patient_id, &effective_text));
        }

        let diagnostic_report =
            self.diagnostic_report(&observations, &patient_id, &effective_text, effective);
        let patient = self.patient(report, &patient_id, effective);

        let mut entry = Vec::with_capacity(observations.len() + 2);
        entry.push(BundleEntry {
            resource: Resource::Patient(patient),
        });
        entry.push(BundleEntry {
            resource: Resource::DiagnosticReport(diagnostic_report),
        });
        entry.extend(observations.into_iter().map(|observation| BundleEntry {
            resource: Resource::Observation(observation),
        }));

        Assembled {
            bundle: Bundle {
                resource_type: "Bundle".to_string(),
                bundle_type: "collection".to_string(),
                entry,
            },
            patient_id,
            effective,
        }
    }

    /// Sanitizes a captured identifier, or mints one when none was captured.
    fn resolve_patient_id(&self, raw: Option<&str>) -> String {
        match raw {
            Some(raw) => sanitize_identifier(raw),
            None => self.ids.generate("patient"),
        }
    }

    fn observation(
        &self,
        coding: AnalyteCoding,
        value: f64,
        patient_id: &str,
        effective_text: &str,
    ) -> ObservationResource {
        ObservationResource {
            id: self.ids.generate("obs"),
            meta: Meta {
                profile: vec![OBSERVATION_PROFILE.to_string()],
            },
            text: Narrative {
                status: "generated".to_string(),
                div: format!(
                    "<div xmlns=\"{XHTML_NS}\">{}: {} {}</div>",
                    coding.display, value, coding.unit
                ),
            },
            status: "final".to_string(),
            category: vec![CodeableConcept {
                coding: vec![Coding {
                    system: OBSERVATION_CATEGORY_SYSTEM.to_string(),
                    code: LABORATORY_CATEGORY_CODE.to_string(),
                    display: LABORATORY_CATEGORY_DISPLAY.to_string(),
                }],
                text: None,
            }],
            code: CodeableConcept {
                coding: vec![Coding {
                    system: LOINC_SYSTEM.to_string(),
                    code: coding.code.to_string(),
                    display: coding.display.to_string(),
                }],
                text: Some(coding.display.to_string()),
            },
            subject: Reference {
                reference: format!("Patient/{patient_id}"),
            },
            effective_date_time: effective_text.to_string(),
            value_quantity: Quantity {
                value,
                unit: coding.unit.to_string(),
                system: UCUM_SYSTEM.to_string(),
            },
        }
    }

    fn diagnostic_report(
        &self,
        observations: &[ObservationResource],
        patient_id: &str,
        effective_text: &str,
        effective: NaiveDate,
    ) -> DiagnosticReportResource {
        DiagnosticReportResource {
            id: self.ids.generate("report"),
            meta: Meta {
                profile: vec![DIAGNOSTIC_REPORT_PROFILE.to_string()],
            },
            text: Narrative {
                status: "generated".to_string(),
                div: format!("<div xmlns=\"{XHTML_NS}\">CBC Diagnostic Report</div>"),
            },
            status: "final".to_string(),
            code: CodeableConcept {
                coding: vec![Coding {
                    system: LOINC_SYSTEM.to_string(),
                    code: CBC_PANEL_CODE.to_string(),
                    display: CBC_PANEL_DISPLAY.to_string(),
                }],
                text: Some(CBC_PANEL_DISPLAY.to_string()),
            },
            subject: Reference {
                reference: format!("Patient/{patient_id}"),
            },
            effective_date_time: effective_text.to_string(),
            issued: format!("{}{ISSUED_TIME_SUFFIX}", effective.format("%Y-%m-%d")),
            result: observations
                .iter()
                .map(|observation| Reference {
                    reference: format!("Observation/{}", observation.id),
                })
                .collect(),
        }
    }

    fn patient(
        &self,
        report: &StructuredReport,
        patient_id: &str,
        effective: NaiveDate,
    ) -> PatientResource {
        // The unsanitized capture stays the external identity value; the
        // sanitized form is only the resource-local id. When nothing was
        // captured the generated id serves as both.
        let identifier_value = report
            .patient_id
            .clone()
            .unwrap_or_else(|| patient_id.to_string());
        let display_name = report.patient_name.as_deref().unwrap_or("");
        let birth_date = birth_date(effective, report.age);
        let gender = report
            .sex
            .as_deref()
            .map(|sex| sex.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());

        PatientResource {
            identifier: vec![Identifier {
                system: HEALTH_ID_SYSTEM.to_string(),
                value: identifier_value,
            }],
            id: patient_id.to_string(),
            meta: Meta {
                profile: vec![PATIENT_PROFILE.to_string()],
            },
            text: Narrative {
                status: "generated".to_string(),
                div: format!(
                    "<div xmlns=\"{XHTML_NS}\">Patient: {display_name}, Gender: {}, BirthDate: {birth_date}</div>",
                    report.sex.as_deref().unwrap_or("")
                ),
            },
            name: vec![HumanName {
                text: display_name.to_string(),
            }],
            gender,
            birth_date,
        }
    }
}

/// Resolves the effective report date through the fallback chain, landing
/// on the current local date when every parse attempt fails.
fn effective_date(raw: Option<&str>) -> NaiveDate {
    raw.and_then(|text| {
        EFFECTIVE_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
    })
    .unwrap_or_else(|| Local::now().date_naive())
}

/// Approximates a birth date as `effective.year − age` with month and day
/// copied from the effective date. The source reports carry age-at-report
/// only, never an actual date of birth, so this is rendered as a plain
/// formatted string without calendar re-validation.
fn birth_date(effective: NaiveDate, age: Option<u32>) -> String {
    let year = match age {
        Some(age) => effective.year() - age as i32,
        None => effective.year(),
    };
    format!(
        "{year:04}-{:02}-{:02}",
        effective.month(),
        effective.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc_ident::SequentialIdGenerator;
    use cbc_types::AnalyteKey;

    fn full_report() -> StructuredReport {
        let mut report = StructuredReport {
            patient_id: Some("SR/2024,118".to_string()),
            patient_name: Some("MRS. ASHA KUMARI".to_string()),
            age: Some(34),
            sex: Some("Female".to_string()),
            report_date: Some("2024-03-15".to_string()),
            ..StructuredReport::default()
        };
        report.analytes.insert(AnalyteKey::Haemoglobin, 13.5);
        report.analytes.insert(AnalyteKey::Neutrophils, 62.0);
        report.analytes.insert(AnalyteKey::Mcv, 84.3);
        report
    }

    fn entry_patient(bundle: &Bundle) -> &PatientResource {
        match &bundle.entry[0].resource {
            Resource::Patient(patient) => patient,
            other => panic!("expected Patient first, got {other:?}"),
        }
    }

    fn entry_diagnostic_report(bundle: &Bundle) -> &DiagnosticReportResource {
        match &bundle.entry[1].resource {
            Resource::DiagnosticReport(report) => report,
            other => panic!("expected DiagnosticReport second, got {other:?}"),
        }
    }

    fn entry_observations(bundle: &Bundle) -> Vec<&ObservationResource> {
        bundle.entry[2..]
            .iter()
            .map(|entry| match &entry.resource {
                Resource::Observation(observation) => observation,
                other => panic!("expected Observation, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn entry_order_is_patient_report_then_observations() {
        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&full_report());

        assert_eq!(bundle.resource_type, "Bundle");
        assert_eq!(bundle.bundle_type, "collection");
        // Neutrophils percent is captured but unmapped, so 2 + 2 entries.
        assert_eq!(bundle.entry.len(), 4);

        let observations = entry_observations(&bundle);
        let codes: Vec<&str> = observations
            .iter()
            .map(|observation| observation.code.coding[0].code.as_str())
            .collect();
        // Panel order: haemoglobin before MCV.
        assert_eq!(codes, vec!["718-7", "787-2"]);
    }

    #[test]
    fn references_resolve_within_the_bundle() {
        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&full_report());

        let known_ids: Vec<String> = bundle
            .entry
            .iter()
            .map(|entry| entry.resource.id().to_string())
            .collect();

        let diagnostic_report = entry_diagnostic_report(&bundle);
        for reference in &diagnostic_report.result {
            let id = reference
                .reference
                .strip_prefix("Observation/")
                .expect("observation reference");
            assert!(known_ids.iter().any(|known| known == id));
        }

        let patient_id = entry_patient(&bundle).id.clone();
        assert_eq!(
            diagnostic_report.subject.reference,
            format!("Patient/{patient_id}")
        );
        for observation in entry_observations(&bundle) {
            assert_eq!(
                observation.subject.reference,
                format!("Patient/{patient_id}")
            );
        }
    }

    #[test]
    fn captured_identifier_is_sanitized_but_kept_verbatim_in_identity_block() {
        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&full_report());

        let patient = entry_patient(&bundle);
        assert_eq!(patient.id, "SR2024118");
        assert_eq!(patient.identifier[0].value, "SR/2024,118");
        assert_eq!(patient.identifier[0].system, HEALTH_ID_SYSTEM);
        assert_eq!(patient.gender, "female");
        assert_eq!(patient.name[0].text, "MRS. ASHA KUMARI");
    }

    #[test]
    fn absent_identifier_synthesizes_one_id_for_all_references() {
        let mut report = full_report();
        report.patient_id = None;

        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&report);

        let patient = entry_patient(&bundle);
        assert!(patient.id.starts_with("patient-"));
        assert!(patient
            .id
            .chars()
            .all(|c| c.is_alphanumeric() || "-._".contains(c)));
        assert_eq!(patient.identifier[0].value, patient.id);

        let expected = format!("Patient/{}", patient.id);
        assert_eq!(entry_diagnostic_report(&bundle).subject.reference, expected);
        for observation in entry_observations(&bundle) {
            assert_eq!(observation.subject.reference, expected);
        }
    }

    #[test]
    fn birth_date_subtracts_age_from_report_year() {
        let mut report = full_report();
        report.report_date = Some("15-03-2024".to_string());

        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&report);

        // Day-first fallback form resolves to 2024-03-15; age 34 lands 1990.
        assert_eq!(entry_patient(&bundle).birth_date, "1990-03-15");
        assert_eq!(
            entry_diagnostic_report(&bundle).effective_date_time,
            "2024-03-15"
        );
    }

    #[test]
    fn missing_age_collapses_birth_date_to_effective_date() {
        let mut report = full_report();
        report.age = None;

        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&report);
        assert_eq!(entry_patient(&bundle).birth_date, "2024-03-15");
    }

    #[test]
    fn unparseable_date_falls_back_to_today_without_failing() {
        let mut report = full_report();
        report.report_date = Some("32-13-2024".to_string());

        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&report);

        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(entry_diagnostic_report(&bundle).effective_date_time, today);
    }

    #[test]
    fn empty_analyte_map_yields_minimal_bundle() {
        let mut report = full_report();
        report.analytes.clear();

        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&report);

        assert_eq!(bundle.entry.len(), 2);
        assert!(entry_diagnostic_report(&bundle).result.is_empty());
    }

    #[test]
    fn empty_report_degrades_every_field() {
        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&StructuredReport::default());

        let patient = entry_patient(&bundle);
        assert_eq!(patient.gender, "unknown");
        assert_eq!(patient.name[0].text, "");
        assert!(patient.id.starts_with("patient-"));
    }

    #[test]
    fn issued_instant_keeps_fixed_offset_convention() {
        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&full_report());
        assert_eq!(
            entry_diagnostic_report(&bundle).issued,
            "2024-03-15T15:00:00+05:30"
        );
    }

    #[test]
    fn observation_carries_coding_unit_and_quantity() {
        let ids = SequentialIdGenerator::new();
        let bundle = BundleBuilder::new(&ids).build(&full_report());

        let observation = entry_observations(&bundle)[0];
        assert_eq!(observation.status, "final");
        assert_eq!(observation.code.coding[0].system, LOINC_SYSTEM);
        assert_eq!(observation.code.coding[0].code, "718-7");
        assert_eq!(observation.value_quantity.value, 13.5);
        assert_eq!(observation.value_quantity.unit, "g/dL");
        assert_eq!(observation.value_quantity.system, UCUM_SYSTEM);
        assert_eq!(
            observation.category[0].coding[0].code,
            LABORATORY_CATEGORY_CODE
        );
    }

    #[test]
    fn rebuilding_the_same_report_is_structurally_isomorphic() {
        let first = BundleBuilder::new(&SequentialIdGenerator::new()).build(&full_report());
        let second = BundleBuilder::new(&RandomishIds).build(&full_report());

        assert_eq!(first.entry.len(), second.entry.len());
        let shape = |bundle: &Bundle| {
            bundle
                .entry
                .iter()
                .map(|entry| match &entry.resource {
                    Resource::Patient(patient) => format!("Patient:{}", patient.gender),
                    Resource::DiagnosticReport(report) => {
                        format!("DiagnosticReport:{}", report.result.len())
                    }
                    Resource::Observation(observation) => {
                        format!("Observation:{}", observation.code.coding[0].code)
                    }
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&first), shape(&second));
    }

    struct RandomishIds;

    impl cbc_ident::IdGenerator for RandomishIds {
        fn generate(&self, prefix: &str) -> String {
            format!("{prefix}-deadbeef")
        }
    }

    #[test]
    fn write_derives_file_name_from_identifier_and_date() {
        let dir = tempfile::tempdir().expect("temp dir");
        let ids = SequentialIdGenerator::new();

        let path = BundleBuilder::new(&ids)
            .write(&full_report(), dir.path())
            .expect("write bundle");

        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("bundle_SR2024118_20240315.json")
        );

        let contents = std::fs::read_to_string(&path).expect("read bundle back");
        let bundle: Bundle = serde_json::from_str(&contents).expect("bundle parses");
        assert_eq!(bundle.resource_type, "Bundle");
        assert_eq!(bundle.entry.len(), 4);
    }

    #[test]
    fn write_to_missing_directory_surfaces_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope");
        let ids = SequentialIdGenerator::new();

        let err = BundleBuilder::new(&ids)
            .write(&full_report(), &missing)
            .expect_err("missing directory fails");
        assert!(matches!(err, crate::FhirError::Io(_)));
    }
}
