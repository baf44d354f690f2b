//! Report-date extraction and day-first normalization.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static RE_DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}[-/]\d{2}[-/]\d{2,4}").expect("valid date token regex"));

const DATE_LABEL: &str = "Report Date";

/// Day-first formats by year width. Two-digit years follow the usual pivot
/// (`00`–`68` map to 20xx, `69`–`99` to 19xx).
const FOUR_DIGIT_YEAR_FORMATS: [&str; 2] = ["%d-%m-%Y", "%d/%m/%Y"];
const TWO_DIGIT_YEAR_FORMATS: [&str; 2] = ["%d-%m-%y", "%d/%m/%y"];

/// Finds the labeled report-date line and normalizes its date token.
///
/// Only the first line containing the label is consulted, whether or not a
/// token can be extracted from it — repeated date labels further down the
/// page are footer artifacts and less reliable than a missing date.
pub(crate) fn report_date_from_lines(lines: &[&str]) -> Option<String> {
    let line = lines.iter().find(|line| line.contains(DATE_LABEL))?;
    let (_, after_label) = line.split_once(DATE_LABEL)?;
    let token = RE_DATE_TOKEN.find(after_label)?.as_str();
    parse_day_first(token).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Parses a `DD-MM-YY[YY]` token, `-` or `/` separated.
fn parse_day_first(token: &str) -> Option<NaiveDate> {
    let year_width = token.rsplit(['-', '/']).next().map(str::len)?;
    let formats = if year_width == 2 {
        TWO_DIGIT_YEAR_FORMATS
    } else {
        FOUR_DIGIT_YEAR_FORMATS
    };
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
}
