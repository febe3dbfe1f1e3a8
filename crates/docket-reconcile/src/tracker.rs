//! Report tracker bookkeeping: the last accepted as-of date per county and
//! report category.

use std::collections::BTreeMap;

use docket_core::{
  date::{AsOfDate, LoadStamp},
  report::{County, ReportCategory},
  table::{Row, Table},
  tracker::TrackerEntry,
};

use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct TrackerBook {
  entries: BTreeMap<(County, ReportCategory), TrackerEntry>,
  /// Store version of the tracker table this book was loaded from.
  version: u64,
}

impl TrackerBook {
  pub fn load(table: &Table) -> Result<Self> {
    let mut entries = BTreeMap::new();
    for row in &table.rows {
      let entry = TrackerEntry::from_row(row)?;
      entries.insert((entry.county, entry.category), entry);
    }
    Ok(Self { entries, version: table.version })
  }

  pub fn version(&self) -> u64 { self.version }

  pub(crate) fn set_version(&mut self, version: u64) { self.version = version; }

  pub fn last(
    &self,
    county: County,
    category: ReportCategory,
  ) -> Option<AsOfDate> {
    self.entries.get(&(county, category)).map(|e| e.report_date)
  }

  /// Every recorded as-of date, one per tracked (county, category).
  pub fn recorded_dates(&self) -> impl Iterator<Item = AsOfDate> + '_ {
    self.entries.values().map(|e| e.report_date)
  }

  pub fn record(
    &mut self,
    county: County,
    category: ReportCategory,
    report_date: AsOfDate,
    load_datetime: LoadStamp,
  ) {
    self.entries.insert((county, category), TrackerEntry {
      county,
      category,
      report_date,
      load_datetime: Some(load_datetime),
    });
  }

  /// Entries sorted by county, then report type, by their stored names.
  pub fn entries(&self) -> Vec<&TrackerEntry> {
    let mut entries: Vec<&TrackerEntry> = self.entries.values().collect();
    entries.sort_by(|a, b| {
      (a.county.as_ref(), a.category.as_ref())
        .cmp(&(b.county.as_ref(), b.category.as_ref()))
    });
    entries
  }

  pub fn rows(&self) -> Vec<Row> {
    self.entries().into_iter().map(TrackerEntry::to_row).collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::{FixedOffset, TimeZone};
  use docket_core::table::cell;

  use super::*;

  fn stamp() -> LoadStamp {
    let tz = FixedOffset::west_opt(6 * 3600).unwrap();
    LoadStamp::new(tz.with_ymd_and_hms(2024, 4, 16, 9, 0, 0).unwrap())
  }

  #[test]
  fn rows_are_sorted_by_county_then_type() {
    let mut book = TrackerBook::default();
    let d = AsOfDate::parse("04/15/2024").unwrap();
    book.record(County::Zavala, ReportCategory::Civil, d, stamp());
    book.record(County::Dimmit, ReportCategory::Juvenile, d, stamp());
    book.record(County::Dimmit, ReportCategory::Civil, d, stamp());
    let rows = book.rows();
    let keys: Vec<(&str, &str)> = rows
      .iter()
      .map(|r| (cell(r, "County"), cell(r, "Report Type")))
      .collect();
    assert_eq!(keys, vec![
      ("Dimmit", "Civil"),
      ("Dimmit", "Juvenile"),
      ("Zavala", "Civil"),
    ]);
  }

  #[test]
  fn load_reads_back_recorded_rows() {
    let mut book = TrackerBook::default();
    let d = AsOfDate::parse("04/15/2024").unwrap();
    book.record(County::Maverick, ReportCategory::CriminalInactive, d, stamp());
    let table = Table {
      header:  vec![],
      rows:    book.rows(),
      version: 7,
    };
    let loaded = TrackerBook::load(&table).unwrap();
    assert_eq!(loaded.version(), 7);
    assert_eq!(
      loaded.last(County::Maverick, ReportCategory::CriminalInactive),
      Some(d)
    );
    assert_eq!(loaded.last(County::Maverick, ReportCategory::Civil), None);
  }
}
