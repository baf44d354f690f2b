//! Static terminology configuration for the CBC panel.
//!
//! The coded identity of every emitted resource lives here: LOINC codes and
//! UCUM units for the eight terminology-mapped analytes, the fixed panel
//! code for the diagnostic report, and the NDHM profile URLs. This table is
//! configuration, not derived data — codes change only when the profile
//! does.

use cbc_types::AnalyteKey;

pub const LOINC_SYSTEM: &str = "http://loinc.org";
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";
pub const OBSERVATION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";

/// Identity system for the external patient identifier.
pub const HEALTH_ID_SYSTEM: &str = "https://ndhm.gov.in/health_id";

pub const PATIENT_PROFILE: &str = "https://nrces.in/ndhm/fhir/r4/StructureDefinition/Patient";
pub const OBSERVATION_PROFILE: &str =
    "https://nrces.in/ndhm/fhir/r4/StructureDefinition/Observation";
pub const DIAGNOSTIC_REPORT_PROFILE: &str =
    "https://nrces.in/ndhm/fhir/r4/StructureDefinition/DiagnosticReportLab";

/// Fixed LOINC code of the whole panel.
pub const CBC_PANEL_CODE: &str = "58410-2";
pub const CBC_PANEL_DISPLAY: &str = "CBC panel - Blood";

pub const LABORATORY_CATEGORY_CODE: &str = "laboratory";
pub const LABORATORY_CATEGORY_DISPLAY: &str = "Laboratory";

/// Coded identity of one terminology-mapped analyte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalyteCoding {
    pub code: &'static str,
    pub display: &'static str,
    pub unit: &'static str,
}

/// Returns the LOINC coding for a key, or `None` for captured-but-unmapped
/// keys (the percent differentials), which the builder silently skips.
pub fn loinc_coding(key: AnalyteKey) -> Option<AnalyteCoding> {
    let coding = match key {
        AnalyteKey::Haemoglobin => AnalyteCoding {
            code: "718-7",
            display: "Hemoglobin",
            unit: "g/dL",
        },
        AnalyteKey::RbcCount => AnalyteCoding {
            code: "789-8",
            display: "Erythrocytes",
            unit: "10^6/uL",
        },
        AnalyteKey::LeucocyteCount => AnalyteCoding {
            code: "6690-2",
            display: "Leukocytes",
            unit: "10^3/uL",
        },
        AnalyteKey::PlateletCount => AnalyteCoding {
            code: "777-3",
            display: "Platelets",
            unit: "10^3/uL",
        },
        AnalyteKey::Pcv => AnalyteCoding {
            code: "4544-3",
            display: "Hematocrit",
            unit: "%",
        },
        AnalyteKey::Mcv => AnalyteCoding {
            code: "787-2",
            display: "MCV",
            unit: "fL",
        },
        AnalyteKey::Mch => AnalyteCoding {
            code: "785-6",
            display: "MCH",
            unit: "pg",
        },
        AnalyteKey::Mchc => AnalyteCoding {
            code: "786-4",
            display: "MCHC",
            unit: "g/dL",
        },
        AnalyteKey::Neutrophils
        | AnalyteKey::Lymphocytes
        | AnalyteKey::Eosinophils
        | AnalyteKey::Monocytes
        | AnalyteKey::Basophils
        | AnalyteKey::Rdw => return None,
    };
    Some(coding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haemoglobin_maps_to_loinc() {
        let coding = loinc_coding(AnalyteKey::Haemoglobin).expect("mapped key");
        assert_eq!(coding.code, "718-7");
        assert_eq!(coding.display, "Hemoglobin");
        assert_eq!(coding.unit, "g/dL");
    }

    #[test]
    fn differential_percentages_are_unmapped() {
        for key in [
            AnalyteKey::Neutrophils,
            AnalyteKey::Lymphocytes,
            AnalyteKey::Eosinophils,
            AnalyteKey::Monocytes,
            AnalyteKey::Basophils,
            AnalyteKey::Rdw,
        ] {
            assert!(loinc_coding(key).is_none(), "{key} should be unmapped");
        }
    }

    #[test]
    fn exactly_eight_keys_are_mapped() {
        let mapped = AnalyteKey::ALL
            .into_iter()
            .filter(|key| loinc_coding(*key).is_some())
            .count();
        assert_eq!(mapped, 8);
    }
}
