//! Rows of the report tracker: the last accepted as-of date per county and
//! report category.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  case::put,
  date::{AsOfDate, LoadStamp, load_cell},
  report::{County, ReportCategory},
  table::{Row, cell, field},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerEntry {
  pub county:        County,
  pub category:      ReportCategory,
  pub report_date:   AsOfDate,
  pub load_datetime: Option<LoadStamp>,
}

impl TrackerEntry {
  pub fn from_row(row: &Row) -> Result<Self> {
    let county_cell = cell(row, field::COUNTY);
    let county = County::from_cell(county_cell);
    if !county.is_resolved() {
      return Err(Error::field(field::COUNTY, county_cell));
    }
    let category_cell = cell(row, field::REPORT_TYPE).trim();
    Ok(Self {
      county,
      category: category_cell
        .parse()
        .map_err(|_| Error::field(field::REPORT_TYPE, category_cell))?,
      report_date: AsOfDate::parse(cell(row, field::REPORT_DATE))?,
      load_datetime: LoadStamp::parse_cell(cell(row, field::LOAD_DATETIME))?,
    })
  }

  pub fn to_row(&self) -> Row {
    let mut row = Row::new();
    put(&mut row, field::COUNTY, self.county.as_ref());
    put(&mut row, field::REPORT_TYPE, self.category.as_ref());
    put(&mut row, field::REPORT_DATE, &self.report_date.to_string());
    put(&mut row, field::LOAD_DATETIME, &load_cell(self.load_datetime));
    row
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tracker_row_round_trips() {
    let entry = TrackerEntry {
      county:        County::Dimmit,
      category:      ReportCategory::CriminalDisposed,
      report_date:   AsOfDate::parse("04/15/2024").unwrap(),
      load_datetime: None,
    };
    let row = entry.to_row();
    assert_eq!(cell(&row, "Report Type"), "Criminal Disposed");
    assert_eq!(TrackerEntry::from_row(&row).unwrap(), entry);
  }

  #[test]
  fn unresolved_county_is_rejected() {
    let mut row = Row::new();
    row.insert("County".into(), "Unknown".into());
    row.insert("Report Type".into(), "Civil".into());
    row.insert("Report Date".into(), "04/15/2024".into());
    assert!(TrackerEntry::from_row(&row).is_err());
  }
}
