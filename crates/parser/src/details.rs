//! Patient-detail extraction rules.
//!
//! Each rule is a pure function from one transcript line to an optional
//! field. The rules are evaluated per line in [`RULES`] order and merged
//! with first-match-wins semantics: printed reports repeat labels in headers
//! and footers, and later occurrences are usually degraded OCR artifacts, so
//! a field once set is never overwritten.

use regex::Regex;
use std::sync::LazyLock;

static RE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Patient Name\s*:\s*(.+?)\s+Receiving Date").expect("valid name regex")
});
static RE_SAMPLE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Sample Id\. No\.\s*:\s*([\w/,-]+)").expect("valid sample id regex")
});
static RE_AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Age\s*:\s*(\d+)").expect("valid age regex"));
static RE_SEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Sex\s*:\s*(\w+)").expect("valid sex regex"));

/// Age and sex share one line on the printed layout; requiring both markers
/// prevents false positives from prose that mentions only one of them.
const AGE_MARKER: &str = "Age :";
const SEX_MARKER: &str = "Sex :";

/// One extracted patient-detail field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Field {
    Name(String),
    SampleId(String),
    AgeSex {
        age: Option<u32>,
        sex: Option<String>,
    },
}

type Rule = fn(&str) -> Option<Field>;

/// Detail rules in evaluation order.
pub(crate) const RULES: [Rule; 3] = [name_rule, sample_id_rule, age_sex_rule];

/// Patient details accumulated over a transcript.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PatientDetails {
    pub name: Option<String>,
    pub sample_id: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
}

impl PatientDetails {
    /// Merges one extracted field, keeping any value already set.
    fn absorb(&mut self, field: Field) {
        match field {
            Field::Name(name) => {
                self.name.get_or_insert(name);
            }
            Field::SampleId(id) => {
                self.sample_id.get_or_insert(id);
            }
            Field::AgeSex { age, sex } => {
                if self.age.is_none() {
                    self.age = age;
                }
                if self.sex.is_none() {
                    self.sex = sex;
                }
            }
        }
    }
}

/// Runs every rule over every line, first match per field wins.
pub(crate) fn scan(lines: &[&str]) -> PatientDetails {
    let mut details = PatientDetails::default();
    for line in lines {
        for rule in RULES {
            if let Some(field) = rule(line) {
                details.absorb(field);
            }
        }
    }
    details
}

/// Captures the text between the name label and the adjacent receiving-date
/// label on the same line.
fn name_rule(line: &str) -> Option<Field> {
    let captures = RE_NAME.captures(line)?;
    Some(Field::Name(captures[1].trim().to_string()))
}

/// Captures the token of word characters, `/`, `,`, `-` after the sample
/// identifier label.
fn sample_id_rule(line: &str) -> Option<Field> {
    let captures = RE_SAMPLE_ID.captures(line)?;
    Some(Field::SampleId(captures[1].to_string()))
}

/// Extracts age and sex from a line carrying both markers.
fn age_sex_rule(line: &str) -> Option<Field> {
    if !(line.contains(AGE_MARKER) && line.contains(SEX_MARKER)) {
        return None;
    }
    let age = RE_AGE
        .captures(line)
        .and_then(|c| c[1].parse::<u32>().ok());
    let sex = RE_SEX.captures(line).map(|c| c[1].to_string());
    Some(Field::AgeSex { age, sex })
}
