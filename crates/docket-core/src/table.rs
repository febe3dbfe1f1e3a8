//! Table identities, column headers, and the untyped row form exchanged with
//! a [`TableStore`](crate::store::TableStore).

use std::{collections::BTreeMap, sync::LazyLock};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::case::{CaseType, Domain};

/// One stored row: column name to cell text. Missing columns read as blank.
pub type Row = BTreeMap<String, String>;

/// A full table snapshot as returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
  pub header:  Vec<String>,
  pub rows:    Vec<Row>,
  /// Bumped by the store on every write; 0 for a table never written.
  pub version: u64,
}

/// Read a cell, treating an absent column as blank.
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a str {
  row.get(column).map(String::as_str).unwrap_or("")
}

/// Restrict `row` to exactly the columns of `header`, blank-filling gaps.
pub fn shape(header: &[&str], row: &Row) -> Row {
  header
    .iter()
    .map(|c| ((*c).to_string(), cell(row, c).to_string()))
    .collect()
}

pub fn header_vec(header: &[&str]) -> Vec<String> {
  header.iter().map(|c| (*c).to_string()).collect()
}

// ─── Column names ────────────────────────────────────────────────────────────

pub mod field {
  pub const COUNTY: &str = "County";
  pub const CAUSE_NUMBER: &str = "Cause Number";
  pub const FILE_DATE: &str = "File Date";
  pub const DOCKET_DATE: &str = "Docket Date";
  pub const COURT: &str = "Court";
  pub const CAUSE: &str = "Cause";
  pub const CAUSE_OF_ACTION: &str = "Cause of Action";
  pub const DOCKET_TYPE: &str = "Docket Type";
  pub const ANS_FILE: &str = "ANS File";
  pub const CR_NUMBER: &str = "CR Number";
  pub const FIRST_OFFENSE: &str = "First Offense";
  pub const OUTSTANDING_WARRANTS: &str = "Outstanding Warrants";
  pub const ST_RPT_COLUMN: &str = "ST RPT Column";
  pub const OFFENSE: &str = "Offense";
  pub const CASE_TYPE: &str = "Case Type";
  pub const STATUS: &str = "Status";
  pub const REPORT_GENERATED_DATE: &str = "Report Generated Date";
  pub const ORIGINAL_AS_OF_DATE: &str = "Original As Of Date";
  pub const LAST_AS_OF_DATE: &str = "Last As Of Date";
  pub const LOAD_DATETIME: &str = "Load DateTime";
  pub const DROPPED_DATETIME: &str = "Dropped DateTime";
  pub const DISPOSED_DATES: &str = "Disposed Dates";
  pub const DISPOSITIONS: &str = "Dispositions";
  pub const DISPOSED_AS_OF_DATE: &str = "Disposed As Of Date";
  pub const NUMBER_OF_DISPOSITIONS: &str = "Number Of Dispositions";
  pub const INACTIVE_START_DATE: &str = "Inactive Start Date";
  pub const INACTIVE_END_DATE: &str = "Inactive End Date";
  pub const INACTIVE_REASON: &str = "Inactive Reason";
  pub const ESTIMATED_INACTIVE_END_DATE: &str = "Estimated Inactive End Date";
  pub const REPORT_TYPE: &str = "Report Type";
  pub const REPORT_DATE: &str = "Report Date";
}

use field::*;

// ─── Headers ─────────────────────────────────────────────────────────────────

const CIVIL_OPEN: &[&str] = &[
  COUNTY,
  CAUSE_NUMBER,
  FILE_DATE,
  DOCKET_DATE,
  CAUSE_OF_ACTION,
  DOCKET_TYPE,
  ANS_FILE,
  CR_NUMBER,
  CASE_TYPE,
  STATUS,
  REPORT_GENERATED_DATE,
  ORIGINAL_AS_OF_DATE,
  LAST_AS_OF_DATE,
  LOAD_DATETIME,
];

const CRIMINAL_OPEN: &[&str] = &[
  COUNTY,
  CAUSE_NUMBER,
  FILE_DATE,
  DOCKET_DATE,
  FIRST_OFFENSE,
  OUTSTANDING_WARRANTS,
  ST_RPT_COLUMN,
  CASE_TYPE,
  STATUS,
  REPORT_GENERATED_DATE,
  ORIGINAL_AS_OF_DATE,
  LAST_AS_OF_DATE,
  LOAD_DATETIME,
];

const JUVENILE_OPEN: &[&str] = &[
  COUNTY,
  CAUSE_NUMBER,
  FILE_DATE,
  DOCKET_DATE,
  OFFENSE,
  CASE_TYPE,
  STATUS,
  REPORT_GENERATED_DATE,
  ORIGINAL_AS_OF_DATE,
  LAST_AS_OF_DATE,
  LOAD_DATETIME,
];

const CLOSED_TAIL: &[&str] = &[
  DROPPED_DATETIME,
  DISPOSED_DATES,
  DISPOSITIONS,
  DISPOSED_AS_OF_DATE,
  NUMBER_OF_DISPOSITIONS,
];

/// Closed archives carry their open table's columns plus the closed tail.
static CIVIL_CLOSED: LazyLock<Vec<&str>> =
  LazyLock::new(|| [CIVIL_OPEN, CLOSED_TAIL].concat());
static CRIMINAL_CLOSED: LazyLock<Vec<&str>> =
  LazyLock::new(|| [CRIMINAL_OPEN, CLOSED_TAIL].concat());
static JUVENILE_CLOSED: LazyLock<Vec<&str>> =
  LazyLock::new(|| [JUVENILE_OPEN, CLOSED_TAIL].concat());

const INACTIVE: &[&str] = &[
  COUNTY,
  CAUSE_NUMBER,
  FILE_DATE,
  CASE_TYPE,
  STATUS,
  INACTIVE_START_DATE,
  INACTIVE_END_DATE,
  INACTIVE_REASON,
  ESTIMATED_INACTIVE_END_DATE,
  ORIGINAL_AS_OF_DATE,
  LAST_AS_OF_DATE,
  LOAD_DATETIME,
];

pub const COMMON: &[&str] = &[
  COUNTY,
  CAUSE_NUMBER,
  FILE_DATE,
  DOCKET_DATE,
  COURT,
  CAUSE,
  DOCKET_TYPE,
  ANS_FILE,
  CR_NUMBER,
  CASE_TYPE,
  STATUS,
  OUTSTANDING_WARRANTS,
  ST_RPT_COLUMN,
  REPORT_GENERATED_DATE,
  ORIGINAL_AS_OF_DATE,
  LAST_AS_OF_DATE,
  LOAD_DATETIME,
  DROPPED_DATETIME,
  DISPOSED_DATES,
  DISPOSITIONS,
  DISPOSED_AS_OF_DATE,
  NUMBER_OF_DISPOSITIONS,
];

pub const TRACKER: &[&str] = &[COUNTY, REPORT_TYPE, REPORT_DATE, LOAD_DATETIME];

// ─── TableId ─────────────────────────────────────────────────────────────────

/// Every table the engine reads or writes, named as it appears in the store.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TableId {
  #[strum(serialize = "Civil Cases")]
  CivilCases,
  #[strum(serialize = "Closed Civil Cases")]
  ClosedCivilCases,
  #[strum(serialize = "OLS Civil Cases")]
  OlsCivilCases,
  #[strum(serialize = "Closed OLS Civil Cases")]
  ClosedOlsCivilCases,
  #[strum(serialize = "Criminal Cases")]
  CriminalCases,
  #[strum(serialize = "Closed Criminal Cases")]
  ClosedCriminalCases,
  #[strum(serialize = "OLS Criminal Cases")]
  OlsCriminalCases,
  #[strum(serialize = "Closed OLS Criminal Cases")]
  ClosedOlsCriminalCases,
  #[strum(serialize = "Juvenile Cases")]
  JuvenileCases,
  #[strum(serialize = "Closed Juvenile Cases")]
  ClosedJuvenileCases,
  #[strum(serialize = "Inactive Civil Cases")]
  InactiveCivilCases,
  #[strum(serialize = "Inactive Criminal Cases")]
  InactiveCriminalCases,
  #[strum(serialize = "Common Table")]
  CommonTable,
  #[strum(serialize = "Report Tracker")]
  ReportTracker,
}

/// The open table and closed archive a case type reconciles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePair {
  pub open:   TableId,
  pub closed: TableId,
}

impl TablePair {
  pub fn for_case_type(case_type: CaseType) -> Self {
    let (open, closed) = match case_type {
      CaseType::Civil | CaseType::Tax => {
        (TableId::CivilCases, TableId::ClosedCivilCases)
      }
      CaseType::CivilOls => (TableId::OlsCivilCases, TableId::ClosedOlsCivilCases),
      CaseType::Criminal => {
        (TableId::CriminalCases, TableId::ClosedCriminalCases)
      }
      CaseType::CriminalOls => {
        (TableId::OlsCriminalCases, TableId::ClosedOlsCriminalCases)
      }
      CaseType::Juvenile => {
        (TableId::JuvenileCases, TableId::ClosedJuvenileCases)
      }
    };
    Self { open, closed }
  }
}

impl TableId {
  /// The canonical header this table is written with.
  pub fn header(&self) -> &'static [&'static str] {
    match self {
      Self::CivilCases | Self::OlsCivilCases => CIVIL_OPEN,
      Self::ClosedCivilCases | Self::ClosedOlsCivilCases => &CIVIL_CLOSED,
      Self::CriminalCases | Self::OlsCriminalCases => CRIMINAL_OPEN,
      Self::ClosedCriminalCases | Self::ClosedOlsCriminalCases => {
        &CRIMINAL_CLOSED
      }
      Self::JuvenileCases => JUVENILE_OPEN,
      Self::ClosedJuvenileCases => &JUVENILE_CLOSED,
      Self::InactiveCivilCases | Self::InactiveCriminalCases => INACTIVE,
      Self::CommonTable => COMMON,
      Self::ReportTracker => TRACKER,
    }
  }

  /// The domain whose columns an open or closed case table carries.
  pub fn domain(&self) -> Option<Domain> {
    match self {
      Self::CivilCases
      | Self::ClosedCivilCases
      | Self::OlsCivilCases
      | Self::ClosedOlsCivilCases => Some(Domain::Civil),
      Self::CriminalCases
      | Self::ClosedCriminalCases
      | Self::OlsCriminalCases
      | Self::ClosedOlsCriminalCases => Some(Domain::Criminal),
      Self::JuvenileCases | Self::ClosedJuvenileCases => Some(Domain::Juvenile),
      Self::InactiveCivilCases
      | Self::InactiveCriminalCases
      | Self::CommonTable
      | Self::ReportTracker => None,
    }
  }

}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn closed_headers_extend_open_headers() {
    for case_type in [CaseType::Civil, CaseType::Criminal, CaseType::Juvenile] {
      let pair = TablePair::for_case_type(case_type);
      let mut expected = pair.open.header().to_vec();
      expected.extend_from_slice(CLOSED_TAIL);
      assert_eq!(pair.closed.header(), expected.as_slice());
      assert_eq!(pair.closed.domain(), pair.open.domain());
    }
  }

  #[test]
  fn tax_shares_the_civil_tables() {
    assert_eq!(
      TablePair::for_case_type(CaseType::Tax),
      TablePair::for_case_type(CaseType::Civil)
    );
  }

  #[test]
  fn table_names_round_trip() {
    for table in TableId::iter() {
      let name = table.to_string();
      assert_eq!(name.parse::<TableId>().unwrap(), table);
    }
    assert_eq!(TableId::CommonTable.to_string(), "Common Table");
  }

  #[test]
  fn common_header_has_no_domain_only_columns() {
    assert_eq!(COMMON.len(), 22);
    assert!(!COMMON.contains(&field::CAUSE_OF_ACTION));
    assert!(!COMMON.contains(&field::OFFENSE));
  }

  #[test]
  fn shape_blank_fills_and_drops_foreign_columns() {
    let mut row = Row::new();
    row.insert("Cause Number".into(), "24-01".into());
    row.insert("Bogus".into(), "x".into());
    let shaped = shape(&["County", "Cause Number"], &row);
    assert_eq!(shaped.len(), 2);
    assert_eq!(cell(&shaped, "County"), "");
    assert_eq!(cell(&shaped, "Cause Number"), "24-01");
  }
}
