//! Report identity: which county, which kind of report, and the header facts
//! sniffed from the report text before any rows are looked at.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ─── County ──────────────────────────────────────────────────────────────────

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
  AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum County {
  Dimmit,
  Maverick,
  Zavala,
  /// Header names more than one county; never a valid upload target.
  #[strum(serialize = "All Counties")]
  #[serde(rename = "All Counties")]
  AllCounties,
  Unknown,
}

impl County {
  /// Whether reports for this county may be reconciled.
  pub fn is_resolved(&self) -> bool {
    matches!(self, Self::Dimmit | Self::Maverick | Self::Zavala)
  }

  /// Parse a table cell, falling back to [`County::Unknown`].
  pub fn from_cell(cell: &str) -> Self {
    cell.trim().parse().unwrap_or(Self::Unknown)
  }
}

// ─── ReportCategory ──────────────────────────────────────────────────────────

/// The report types tracked by the freshness gate.
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
pub enum ReportCategory {
  Civil,
  #[strum(serialize = "Civil Disposed")]
  #[serde(rename = "Civil Disposed")]
  CivilDisposed,
  #[strum(serialize = "Civil Inactive")]
  #[serde(rename = "Civil Inactive")]
  CivilInactive,
  Criminal,
  #[strum(serialize = "Criminal Disposed")]
  #[serde(rename = "Criminal Disposed")]
  CriminalDisposed,
  #[strum(serialize = "Criminal Inactive")]
  #[serde(rename = "Criminal Inactive")]
  CriminalInactive,
  Juvenile,
}

/// The reconciliation path a report category takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportShape {
  Pending,
  Disposed,
  Inactive,
  Juvenile,
}

impl ReportCategory {
  pub fn shape(&self) -> ReportShape {
    match self {
      Self::Civil | Self::Criminal => ReportShape::Pending,
      Self::CivilDisposed | Self::CriminalDisposed => ReportShape::Disposed,
      Self::CivilInactive | Self::CriminalInactive => ReportShape::Inactive,
      Self::Juvenile => ReportShape::Juvenile,
    }
  }

  pub fn is_criminal(&self) -> bool {
    matches!(
      self,
      Self::Criminal | Self::CriminalDisposed | Self::CriminalInactive
    )
  }
}

// ─── ReportHeader ────────────────────────────────────────────────────────────

/// Facts derived from a report's header text by the upstream parser.
///
/// Unresolved values are kept as-is so the freshness gate can reject the
/// report with a precise reason instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
  #[serde(default)]
  pub category:       Option<ReportCategory>,
  #[serde(default = "unknown_county")]
  pub county:         County,
  #[serde(default)]
  pub district_court: bool,
  /// Raw as-of date text, e.g. `04/15/2024`.
  #[serde(default)]
  pub as_of_date:     String,
  /// Where the report came from, typically the uploaded file name. Case-type
  /// classification looks for `OLS`/`CR`/`CV` markers in it.
  #[serde(default)]
  pub source_label:   String,
}

fn unknown_county() -> County { County::Unknown }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn county_parses_case_insensitively() {
    assert_eq!(County::from_cell("dimmit"), County::Dimmit);
    assert_eq!(County::from_cell(" ZAVALA "), County::Zavala);
    assert_eq!(County::from_cell("All Counties"), County::AllCounties);
    assert_eq!(County::from_cell("Webb"), County::Unknown);
    assert!(!County::AllCounties.is_resolved());
  }

  #[test]
  fn category_names_match_tracker_cells() {
    assert_eq!(ReportCategory::CivilDisposed.to_string(), "Civil Disposed");
    assert_eq!(
      "criminal inactive".parse::<ReportCategory>().unwrap(),
      ReportCategory::CriminalInactive
    );
    assert_eq!(ReportCategory::Juvenile.shape(), ReportShape::Juvenile);
  }

  #[test]
  fn header_defaults_to_unresolved() {
    let header: ReportHeader = serde_json::from_str("{}").unwrap();
    assert_eq!(header.county, County::Unknown);
    assert_eq!(header.category, None);
    assert!(!header.district_court);
  }
}
