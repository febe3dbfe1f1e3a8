//! Parser output: flat case rows whose values are a single string or an
//! ordered list of strings accumulated across report lines.

use std::collections::BTreeMap;

use docket_core::{date::History, report::ReportHeader};
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
  Text(String),
  List(Vec<String>),
}

impl RawValue {
  /// Join list values with `\n` in encounter order.
  pub fn flatten(&self) -> String {
    match self {
      Self::Text(s) => s.trim().to_string(),
      Self::List(items) => History::from_entries(items).to_cell(),
    }
  }

  pub fn to_history(&self) -> History {
    match self {
      Self::Text(s) => History::from_cell(s),
      Self::List(items) => History::from_entries(items),
    }
  }
}

impl From<&str> for RawValue {
  fn from(s: &str) -> Self { Self::Text(s.to_string()) }
}

impl From<Vec<&str>> for RawValue {
  fn from(items: Vec<&str>) -> Self {
    Self::List(items.into_iter().map(str::to_string).collect())
  }
}

pub type RawRecord = BTreeMap<String, RawValue>;

pub(crate) fn text(record: &RawRecord, key: &str) -> String {
  record.get(key).map(RawValue::flatten).unwrap_or_default()
}

pub(crate) fn history(record: &RawRecord, key: &str) -> History {
  record.get(key).map(RawValue::to_history).unwrap_or_default()
}

/// One report as handed over by the parser: its header facts and rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFile {
  pub header: ReportHeader,
  #[serde(default)]
  pub rows:   Vec<RawRecord>,
}

impl ReportFile {
  pub fn from_json(input: &str) -> Result<Self> {
    Ok(serde_json::from_str(input)?)
  }
}

#[cfg(test)]
mod tests {
  use docket_core::report::{County, ReportCategory};

  use super::*;

  #[test]
  fn lists_flatten_in_encounter_order() {
    let v = RawValue::from(vec!["THEFT", " ", "ASSAULT"]);
    assert_eq!(v.flatten(), "THEFT\nASSAULT");
    assert_eq!(v.to_history().len(), 2);
  }

  #[test]
  fn report_file_accepts_text_and_list_values() {
    let json = r#"{
      "header": {
        "category": "Criminal",
        "county": "Zavala",
        "district_court": true,
        "as_of_date": "04/15/2024",
        "source_label": "zavala_cr_pending.pdf"
      },
      "rows": [
        {"Cause Number": "24-01-00001-CR", "First Offense": ["DWI", "EVADING"]}
      ]
    }"#;
    let file = ReportFile::from_json(json).unwrap();
    assert_eq!(file.header.county, County::Zavala);
    assert_eq!(file.header.category, Some(ReportCategory::Criminal));
    assert_eq!(text(&file.rows[0], "First Offense"), "DWI\nEVADING");
    assert_eq!(text(&file.rows[0], "Missing"), "");
  }
}
