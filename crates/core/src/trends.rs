//! Per-analyte time-series aggregation across a batch of reports.
//!
//! This is the structured side of trend visualization: the chart renderer is
//! an external collaborator that consumes the serialized series, so layout
//! and drawing never appear here.

use crate::{PipelineError, PipelineResult};
use cbc_types::{AnalyteKey, StructuredReport};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One dated measurement in a series.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Date-sorted series per analyte key.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct TrendTable {
    pub series: BTreeMap<AnalyteKey, Vec<TrendPoint>>,
}

impl TrendTable {
    /// Aggregates reports into per-analyte series.
    ///
    /// Reports without a canonical `YYYY-MM-DD` report date carry no usable
    /// position on the time axis and are dropped. Each series is sorted by
    /// date; same-date points keep their report order.
    pub fn from_reports(reports: &[StructuredReport]) -> Self {
        let mut series: BTreeMap<AnalyteKey, Vec<TrendPoint>> = BTreeMap::new();

        for report in reports {
            let Some(date) = report
                .report_date
                .as_deref()
                .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
            else {
                continue;
            };
            for (key, value) in &report.analytes {
                series.entry(*key).or_default().push(TrendPoint {
                    date,
                    value: *value,
                });
            }
        }

        for points in series.values_mut() {
            points.sort_by_key(|point| point.date);
        }

        Self { series }
    }

    /// Returns true when no report contributed a datable point.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Serialises the table as indented JSON at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on serialisation or write failure.
    pub fn write_json(&self, path: &Path) -> PipelineResult<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(PipelineError::TrendSerialization)?;
        fs::write(path, json).map_err(PipelineError::TrendWrite)
    }
}
