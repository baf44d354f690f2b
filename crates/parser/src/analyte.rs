//! Analyte-value extraction against the closed label table.

use cbc_types::AnalyteKey;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static RE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid number regex"));

/// Printed test names mapped to canonical keys, in panel order.
///
/// Matching is plain substring containment: OCR output keeps the label text
/// stable but mangles spacing and punctuation around it, so anchored
/// patterns recall far less than containment plus a scan of the line
/// remainder for the first numeric token.
pub(crate) const LABELS: [(&str, AnalyteKey); 14] = [
    ("Haemoglobin", AnalyteKey::Haemoglobin),
    ("Erythrocyte Count", AnalyteKey::RbcCount),
    ("Total Leucocyte Count", AnalyteKey::LeucocyteCount),
    ("Neutrophils", AnalyteKey::Neutrophils),
    ("Lymphocytes", AnalyteKey::Lymphocytes),
    ("Eosinophils", AnalyteKey::Eosinophils),
    ("Monocytes", AnalyteKey::Monocytes),
    ("Basophils", AnalyteKey::Basophils),
    ("Platelets Count", AnalyteKey::PlateletCount),
    ("Hematocrit (PCV)", AnalyteKey::Pcv),
    ("MCV", AnalyteKey::Mcv),
    ("MCH", AnalyteKey::Mch),
    ("MCHC", AnalyteKey::Mchc),
    ("RDW-CV", AnalyteKey::Rdw),
];

/// Extracts every recognized analyte present in the transcript.
///
/// For each label the first line that both contains the label and carries a
/// numeric token after it binds the key; labels that never yield a token are
/// omitted entirely, never defaulted.
pub(crate) fn analytes_from_lines(lines: &[&str]) -> BTreeMap<AnalyteKey, f64> {
    let mut values = BTreeMap::new();
    for (label, key) in LABELS {
        if let Some(value) = value_for_label(lines, label) {
            values.insert(key, value);
        }
    }
    values
}

/// Searches the remainder of a labeled line for its first numeric token.
fn value_for_label(lines: &[&str], label: &str) -> Option<f64> {
    lines.iter().find_map(|line| {
        let (_, after_label) = line.split_once(label)?;
        RE_NUMBER.find(after_label)?.as_str().parse::<f64>().ok()
    })
}
