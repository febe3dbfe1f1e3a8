//! Typed case records for the open tables and their closed archives.
//!
//! Each case carries the shared skeleton every domain has plus a
//! [`CaseDetail`] holding the columns only one domain reports. Rows are
//! parsed into these types when read from a store and rendered back to
//! [`Row`]s when written.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Error, Result,
  date::{
    AsOfDate, History, LoadStamp, as_of_cell, dropped_cell, load_cell,
    parse_dropped_cell,
  },
  report::County,
  table::{Row, cell, field},
};

// ─── Classification ──────────────────────────────────────────────────────────

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
  EnumIter,
  AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum CaseType {
  Civil,
  Criminal,
  #[strum(serialize = "Civil OLS")]
  #[serde(rename = "Civil OLS")]
  CivilOls,
  #[strum(serialize = "Criminal OLS")]
  #[serde(rename = "Criminal OLS")]
  CriminalOls,
  Juvenile,
  Tax,
}

/// Which set of domain-only columns a case type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
  Civil,
  Criminal,
  Juvenile,
}

impl CaseType {
  pub fn domain(&self) -> Domain {
    match self {
      Self::Civil | Self::CivilOls | Self::Tax => Domain::Civil,
      Self::Criminal | Self::CriminalOls => Domain::Criminal,
      Self::Juvenile => Domain::Juvenile,
    }
  }
}

/// Lifecycle status of a case in the open/closed tables.
///
/// `Open -> Dropped | Disposed`, `Dropped -> Open | Disposed`; `Disposed`
/// is terminal.
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
pub enum CaseStatus {
  Open,
  Dropped,
  Disposed,
}

impl CaseStatus {
  pub fn is_closed(&self) -> bool { !matches!(self, Self::Open) }

  /// Precedence when two archive rows describe the same case and share a
  /// load time: a disposition outranks an inferred drop.
  pub fn terminal_rank(&self) -> u8 {
    match self {
      Self::Open => 0,
      Self::Dropped => 1,
      Self::Disposed => 2,
    }
  }
}

// ─── Domain detail ───────────────────────────────────────────────────────────

/// Columns a domain contributes to the common table.
///
/// The projector reads cases only through this trait; columns a domain does
/// not carry default to blank.
pub trait CaseFields {
  /// The domain field copied into the common table's `Cause` column.
  fn cause(&self) -> &str;
  fn docket_type(&self) -> &str { "" }
  fn ans_file(&self) -> &str { "" }
  fn cr_number(&self) -> &str { "" }
  fn outstanding_warrants(&self) -> &str { "" }
  fn st_rpt_column(&self) -> &str { "" }
  /// Write this domain's own columns into a table row.
  fn write(&self, row: &mut Row);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivilDetail {
  pub cause_of_action: String,
  pub docket_type:     String,
  pub ans_file:        String,
  pub cr_number:       String,
}

impl CivilDetail {
  fn read(row: &Row) -> Self {
    Self {
      cause_of_action: cell(row, field::CAUSE_OF_ACTION).to_string(),
      docket_type:     cell(row, field::DOCKET_TYPE).to_string(),
      ans_file:        cell(row, field::ANS_FILE).to_string(),
      cr_number:       cell(row, field::CR_NUMBER).to_string(),
    }
  }
}

impl CaseFields for CivilDetail {
  fn cause(&self) -> &str { &self.cause_of_action }

  fn docket_type(&self) -> &str { &self.docket_type }

  fn ans_file(&self) -> &str { &self.ans_file }

  fn cr_number(&self) -> &str { &self.cr_number }

  fn write(&self, row: &mut Row) {
    put(row, field::CAUSE_OF_ACTION, &self.cause_of_action);
    put(row, field::DOCKET_TYPE, &self.docket_type);
    put(row, field::ANS_FILE, &self.ans_file);
    put(row, field::CR_NUMBER, &self.cr_number);
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriminalDetail {
  pub first_offense:        String,
  pub outstanding_warrants: String,
  pub st_rpt_column:        String,
}

impl CriminalDetail {
  fn read(row: &Row) -> Self {
    Self {
      first_offense:        cell(row, field::FIRST_OFFENSE).to_string(),
      outstanding_warrants: cell(row, field::OUTSTANDING_WARRANTS).to_string(),
      st_rpt_column:        cell(row, field::ST_RPT_COLUMN).to_string(),
    }
  }
}

impl CaseFields for CriminalDetail {
  fn cause(&self) -> &str { &self.first_offense }

  fn outstanding_warrants(&self) -> &str { &self.outstanding_warrants }

  fn st_rpt_column(&self) -> &str { &self.st_rpt_column }

  fn write(&self, row: &mut Row) {
    put(row, field::FIRST_OFFENSE, &self.first_offense);
    put(row, field::OUTSTANDING_WARRANTS, &self.outstanding_warrants);
    put(row, field::ST_RPT_COLUMN, &self.st_rpt_column);
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JuvenileDetail {
  /// One or more offenses, newline-joined.
  pub offense: String,
}

impl CaseFields for JuvenileDetail {
  fn cause(&self) -> &str { &self.offense }

  fn write(&self, row: &mut Row) { put(row, field::OFFENSE, &self.offense); }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum CaseDetail {
  Civil(CivilDetail),
  Criminal(CriminalDetail),
  Juvenile(JuvenileDetail),
}

impl CaseDetail {
  pub fn read(domain: Domain, row: &Row) -> Self {
    match domain {
      Domain::Civil => Self::Civil(CivilDetail::read(row)),
      Domain::Criminal => Self::Criminal(CriminalDetail::read(row)),
      Domain::Juvenile => Self::Juvenile(JuvenileDetail {
        offense: cell(row, field::OFFENSE).to_string(),
      }),
    }
  }

  pub fn fields(&self) -> &dyn CaseFields {
    match self {
      Self::Civil(d) => d,
      Self::Criminal(d) => d,
      Self::Juvenile(d) => d,
    }
  }
}

// ─── Disposition ─────────────────────────────────────────────────────────────

/// Disposition columns; all blank while a case is open or merely dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disposition {
  pub dates:        History,
  pub descriptions: History,
  pub as_of:        Option<AsOfDate>,
  pub count:        u32,
}

impl Disposition {
  pub fn is_empty(&self) -> bool {
    self.dates.is_empty() && self.descriptions.is_empty() && self.as_of.is_none()
  }

  fn read(row: &Row) -> Result<Self> {
    let count_cell = cell(row, field::NUMBER_OF_DISPOSITIONS).trim();
    let count = if count_cell.is_empty() {
      0
    } else {
      count_cell
        .parse()
        .map_err(|_| Error::field(field::NUMBER_OF_DISPOSITIONS, count_cell))?
    };
    Ok(Self {
      dates: History::from_cell(cell(row, field::DISPOSED_DATES)),
      descriptions: History::from_cell(cell(row, field::DISPOSITIONS)),
      as_of: AsOfDate::parse_cell(cell(row, field::DISPOSED_AS_OF_DATE))?,
      count,
    })
  }

  fn write(&self, row: &mut Row) {
    put(row, field::DISPOSED_DATES, &self.dates.to_cell());
    put(row, field::DISPOSITIONS, &self.descriptions.to_cell());
    put(row, field::DISPOSED_AS_OF_DATE, &as_of_cell(self.as_of));
    let count = if self.is_empty() && self.count == 0 {
      String::new()
    } else {
      self.count.to_string()
    };
    put(row, field::NUMBER_OF_DISPOSITIONS, &count);
  }
}

// ─── CaseRecord ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
  pub county:                County,
  pub cause_number:          String,
  pub file_date:             String,
  /// Most recent first.
  pub docket_date:           History,
  pub case_type:             CaseType,
  pub status:                CaseStatus,
  pub report_generated_date: String,
  /// First report that listed the case; never regresses.
  pub original_as_of:        Option<AsOfDate>,
  /// Most recent report that listed the case.
  pub last_as_of:            Option<AsOfDate>,
  pub load_datetime:         Option<LoadStamp>,
  pub dropped_at:            Option<NaiveDateTime>,
  pub disposition:           Disposition,
  pub detail:                CaseDetail,
}

impl CaseRecord {
  /// The business key: a cause number is unique per county within a table.
  pub fn key(&self) -> (County, &str) { (self.county, &self.cause_number) }

  pub fn fields(&self) -> &dyn CaseFields { self.detail.fields() }

  /// Parse a stored row. Missing columns read as blank.
  ///
  /// `domain` comes from the table being read, not the row's case type: a
  /// civil report may list a tax or juvenile-numbered cause alongside
  /// ordinary civil cases, and all of them carry civil columns.
  pub fn from_row(row: &Row, domain: Domain) -> Result<Self> {
    let case_type_cell = cell(row, field::CASE_TYPE).trim();
    let case_type: CaseType = case_type_cell
      .parse()
      .map_err(|_| Error::field(field::CASE_TYPE, case_type_cell))?;
    let status_cell = cell(row, field::STATUS).trim();
    let status: CaseStatus = status_cell
      .parse()
      .map_err(|_| Error::field(field::STATUS, status_cell))?;

    Ok(Self {
      county: County::from_cell(cell(row, field::COUNTY)),
      cause_number: cell(row, field::CAUSE_NUMBER).trim().to_string(),
      file_date: cell(row, field::FILE_DATE).to_string(),
      docket_date: History::from_cell(cell(row, field::DOCKET_DATE)),
      case_type,
      status,
      report_generated_date: cell(row, field::REPORT_GENERATED_DATE)
        .to_string(),
      original_as_of: AsOfDate::parse_cell(cell(
        row,
        field::ORIGINAL_AS_OF_DATE,
      ))?,
      last_as_of: AsOfDate::parse_cell(cell(row, field::LAST_AS_OF_DATE))?,
      load_datetime: LoadStamp::parse_cell(cell(row, field::LOAD_DATETIME))?,
      dropped_at: parse_dropped_cell(cell(row, field::DROPPED_DATETIME))?,
      disposition: Disposition::read(row)?,
      detail: CaseDetail::read(domain, row),
    })
  }

  /// Render every column this record knows about. Callers shape the result
  /// to the destination table's header.
  pub fn to_row(&self) -> Row {
    let mut row = Row::new();
    put(&mut row, field::COUNTY, self.county.as_ref());
    put(&mut row, field::CAUSE_NUMBER, &self.cause_number);
    put(&mut row, field::FILE_DATE, &self.file_date);
    put(&mut row, field::DOCKET_DATE, &self.docket_date.to_cell());
    put(&mut row, field::CASE_TYPE, self.case_type.as_ref());
    put(&mut row, field::STATUS, self.status.as_ref());
    put(
      &mut row,
      field::REPORT_GENERATED_DATE,
      &self.report_generated_date,
    );
    put(
      &mut row,
      field::ORIGINAL_AS_OF_DATE,
      &as_of_cell(self.original_as_of),
    );
    put(&mut row, field::LAST_AS_OF_DATE, &as_of_cell(self.last_as_of));
    put(&mut row, field::LOAD_DATETIME, &load_cell(self.load_datetime));
    put(&mut row, field::DROPPED_DATETIME, &dropped_cell(self.dropped_at));
    self.disposition.write(&mut row);
    self.fields().write(&mut row);
    row
  }

  /// Parse every row of a table, failing on the first malformed row.
  pub fn from_rows<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    domain: Domain,
  ) -> Result<Vec<Self>> {
    rows.into_iter().map(|r| Self::from_row(r, domain)).collect()
  }
}

pub(crate) fn put(row: &mut Row, column: &str, value: &str) {
  row.insert(column.to_string(), value.to_string());
}
