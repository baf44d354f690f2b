//! Shared record types for the CBC Bridge pipeline.
//!
//! The parser produces a [`StructuredReport`] and the bundle builder consumes
//! one; this crate is the only thing the two stages share. Analyte values are
//! keyed by a closed vocabulary ([`AnalyteKey`]) so that unrecognized labels
//! can never leak past the parser.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when resolving an analyte key from text.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The input did not name a recognized analyte key
    #[error("unrecognized analyte key: {0}")]
    Unrecognized(String),
}

/// Canonical key for one CBC analyte.
///
/// Variants are declared in the canonical extraction order of the report
/// panel. `Ord` follows declaration order, so a `BTreeMap` keyed by
/// `AnalyteKey` iterates in panel order — the bundle builder relies on this
/// to emit observations in a stable order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum AnalyteKey {
    #[serde(rename = "haemoglobin_g_dl")]
    Haemoglobin,
    #[serde(rename = "rbc_count_mill_per_cumm")]
    RbcCount,
    #[serde(rename = "leucocyte_count_per_cumm")]
    LeucocyteCount,
    #[serde(rename = "neutrophils_percent")]
    Neutrophils,
    #[serde(rename = "lymphocytes_percent")]
    Lymphocytes,
    #[serde(rename = "eosinophils_percent")]
    Eosinophils,
    #[serde(rename = "monocytes_percent")]
    Monocytes,
    #[serde(rename = "basophils_percent")]
    Basophils,
    #[serde(rename = "platelet_count_per_cumm")]
    PlateletCount,
    #[serde(rename = "pcv_percent")]
    Pcv,
    #[serde(rename = "mcv_fL")]
    Mcv,
    #[serde(rename = "mch_pg")]
    Mch,
    #[serde(rename = "mchc_g_dl")]
    Mchc,
    #[serde(rename = "rdw_percent")]
    Rdw,
}

impl AnalyteKey {
    /// All keys in canonical panel order.
    pub const ALL: [AnalyteKey; 14] = [
        AnalyteKey::Haemoglobin,
        AnalyteKey::RbcCount,
        AnalyteKey::LeucocyteCount,
        AnalyteKey::Neutrophils,
        AnalyteKey::Lymphocytes,
        AnalyteKey::Eosinophils,
        AnalyteKey::Monocytes,
        AnalyteKey::Basophils,
        AnalyteKey::PlateletCount,
        AnalyteKey::Pcv,
        AnalyteKey::Mcv,
        AnalyteKey::Mch,
        AnalyteKey::Mchc,
        AnalyteKey::Rdw,
    ];

    /// Returns the canonical snake-case key used on the wire and on disk.
    pub fn as_key(&self) -> &'static str {
        match self {
            AnalyteKey::Haemoglobin => "haemoglobin_g_dl",
            AnalyteKey::RbcCount => "rbc_count_mill_per_cumm",
            AnalyteKey::LeucocyteCount => "leucocyte_count_per_cumm",
            AnalyteKey::Neutrophils => "neutrophils_percent",
            AnalyteKey::Lymphocytes => "lymphocytes_percent",
            AnalyteKey::Eosinophils => "eosinophils_percent",
            AnalyteKey::Monocytes => "monocytes_percent",
            AnalyteKey::Basophils => "basophils_percent",
            AnalyteKey::PlateletCount => "platelet_count_per_cumm",
            AnalyteKey::Pcv => "pcv_percent",
            AnalyteKey::Mcv => "mcv_fL",
            AnalyteKey::Mch => "mch_pg",
            AnalyteKey::Mchc => "mchc_g_dl",
            AnalyteKey::Rdw => "rdw_percent",
        }
    }
}

impl fmt::Display for AnalyteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl FromStr for AnalyteKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalyteKey::ALL
            .into_iter()
            .find(|key| key.as_key() == s)
            .ok_or_else(|| KeyError::Unrecognized(s.to_string()))
    }
}

/// Structured record recovered from one report transcript.
///
/// Every field is optional: the parser represents "not found" as absence
/// rather than an error, and the bundle builder degrades each missing field
/// to a designated default. The analyte map holds the magnitudes exactly as
/// printed on the source report — no unit conversion happens anywhere in the
/// pipeline.
///
/// The on-disk JSON shape keeps the historical `cbc_report` field name for
/// the analyte map, so records persisted by the driver and hand-authored
/// records fed straight to the bundle builder share one schema.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StructuredReport {
    /// External sample identifier as captured (unsanitized).
    pub patient_id: Option<String>,

    /// Free-text patient name.
    pub patient_name: Option<String>,

    /// Age in years at report time.
    pub age: Option<u32>,

    /// Sex token as captured; lowercased only at bundle-build time.
    pub sex: Option<String>,

    /// Report date normalized to `YYYY-MM-DD`, when normalization succeeded.
    pub report_date: Option<String>,

    /// Recognized analyte values in canonical panel order.
    #[serde(rename = "cbc_report", default)]
    pub analytes: BTreeMap<AnalyteKey, f64>,
}

impl StructuredReport {
    /// Returns true if at least one analyte was recognized.
    ///
    /// An empty map signals "no meaningful data"; the driver uses this to
    /// decide whether a report contributes to trend aggregation.
    pub fn has_analytes(&self) -> bool {
        !self.analytes.is_empty()
    }
}
