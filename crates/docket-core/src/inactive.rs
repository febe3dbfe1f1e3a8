//! Inactive-report tracking: an Active/Inactive sub-status per cause number,
//! independent of the Open/Dropped/Disposed lifecycle.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Error, Result,
  case::{CaseType, put},
  date::{History, LoadStamp, load_cell},
  report::County,
  table::{Row, cell, field},
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum InactiveStatus {
  Active,
  Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveCase {
  pub county:           County,
  pub cause_number:     String,
  pub file_date:        String,
  pub case_type:        CaseType,
  pub status:           InactiveStatus,
  pub inactive_starts:  History,
  pub inactive_ends:    History,
  pub inactive_reasons: History,
  /// Report dates on which the case was seen to leave inactivity, most
  /// recent first.
  pub estimated_end:    History,
  /// One entry per inactive period: the report date that first listed it.
  pub original_as_of:   History,
  /// One entry per inactive period: the latest report date that listed it.
  pub last_as_of:       History,
  pub load_datetime:    Option<LoadStamp>,
}

impl InactiveCase {
  pub fn key(&self) -> (County, &str) { (self.county, &self.cause_number) }

  pub fn from_row(row: &Row) -> Result<Self> {
    let case_type_cell = cell(row, field::CASE_TYPE).trim();
    let status_cell = cell(row, field::STATUS).trim();
    Ok(Self {
      county:           County::from_cell(cell(row, field::COUNTY)),
      cause_number:     cell(row, field::CAUSE_NUMBER).trim().to_string(),
      file_date:        cell(row, field::FILE_DATE).to_string(),
      case_type:        case_type_cell
        .parse()
        .map_err(|_| Error::field(field::CASE_TYPE, case_type_cell))?,
      status:           status_cell
        .parse()
        .map_err(|_| Error::field(field::STATUS, status_cell))?,
      inactive_starts:  History::from_cell(cell(
        row,
        field::INACTIVE_START_DATE,
      )),
      inactive_ends:    History::from_cell(cell(row, field::INACTIVE_END_DATE)),
      inactive_reasons: History::from_cell(cell(row, field::INACTIVE_REASON)),
      estimated_end:    History::from_cell(cell(
        row,
        field::ESTIMATED_INACTIVE_END_DATE,
      )),
      original_as_of:   History::from_cell(cell(
        row,
        field::ORIGINAL_AS_OF_DATE,
      )),
      last_as_of:       History::from_cell(cell(row, field::LAST_AS_OF_DATE)),
      load_datetime:    LoadStamp::parse_cell(cell(row, field::LOAD_DATETIME))?,
    })
  }

  pub fn to_row(&self) -> Row {
    let mut row = Row::new();
    put(&mut row, field::COUNTY, self.county.as_ref());
    put(&mut row, field::CAUSE_NUMBER, &self.cause_number);
    put(&mut row, field::FILE_DATE, &self.file_date);
    put(&mut row, field::CASE_TYPE, self.case_type.as_ref());
    put(&mut row, field::STATUS, self.status.as_ref());
    put(
      &mut row,
      field::INACTIVE_START_DATE,
      &self.inactive_starts.to_cell(),
    );
    put(&mut row, field::INACTIVE_END_DATE, &self.inactive_ends.to_cell());
    put(&mut row, field::INACTIVE_REASON, &self.inactive_reasons.to_cell());
    put(
      &mut row,
      field::ESTIMATED_INACTIVE_END_DATE,
      &self.estimated_end.to_cell(),
    );
    put(
      &mut row,
      field::ORIGINAL_AS_OF_DATE,
      &self.original_as_of.to_cell(),
    );
    put(&mut row, field::LAST_AS_OF_DATE, &self.last_as_of.to_cell());
    put(&mut row, field::LOAD_DATETIME, &load_cell(self.load_datetime));
    row
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::table::{TableId, shape};

  #[test]
  fn inactive_row_round_trips() {
    let row: Row = [
      ("County", "Maverick"),
      ("Cause Number", "22-11-00400-CV"),
      ("File Date", "11/02/2022"),
      ("Case Type", "Civil"),
      ("Status", "Inactive"),
      ("Inactive Start Date", "01/05/2024"),
      ("Inactive End Date", ""),
      ("Inactive Reason", "BANKRUPTCY"),
      ("Estimated Inactive End Date", "12/01/2023"),
      ("Original As Of Date", "02/01/2024\n06/01/2023"),
      ("Last As Of Date", "03/01/2024\n11/01/2023"),
      ("Load DateTime", "2024-03-02 08:00:00.000000-06:00"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let case = InactiveCase::from_row(&row).unwrap();
    assert_eq!(case.status, InactiveStatus::Inactive);
    assert_eq!(case.last_as_of.latest(), Some("03/01/2024"));
    assert_eq!(
      shape(TableId::InactiveCivilCases.header(), &case.to_row()),
      row
    );
  }
}
