//! CBC report transcript parser.
//!
//! Recovers a [`StructuredReport`] from the raw OCR text of a printed CBC
//! report. The input is arbitrarily noisy; extraction is best-effort and the
//! parse never fails — a field that cannot be recovered is simply absent.
//!
//! Extraction is table-driven: patient details come from an ordered set of
//! per-line rules, the report date from a labeled-line scan with day-first
//! normalization, and analyte values from a closed label table. Every field
//! follows first-match-wins, since repeated labels further down a page are
//! usually OCR artifacts of headers and footers.

mod analyte;
mod date;
mod details;

pub use cbc_types::{AnalyteKey, StructuredReport};

/// Parses one report transcript into a structured record.
///
/// Side-effect-free and total: malformed input produces a report with absent
/// fields and possibly an empty analyte map, never an error.
pub fn parse(raw_text: &str) -> StructuredReport {
    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let details = details::scan(&lines);

    StructuredReport {
        patient_id: details.sample_id,
        patient_name: details.name,
        age: details.age,
        sex: details.sex,
        report_date: date::report_date_from_lines(&lines),
        analytes: analyte::analytes_from_lines(&lines),
    }
}
