//! The Common-Table Projector: one denormalized schema unioning every
//! domain's cases for cross-cutting queries.

use crate::{
  Error, Result,
  case::{CaseRecord, CaseStatus, put},
  date::{LoadStamp, as_of_cell, dropped_cell, load_cell},
  report::County,
  table::{COMMON, Row, cell, field, shape},
};

/// One common-table row. The identity columns are parsed; the full row is
/// kept as text in the common schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonRow {
  pub county:        County,
  pub cause_number:  String,
  pub status:        CaseStatus,
  pub load_datetime: Option<LoadStamp>,
  cells:             Row,
}

impl CommonRow {
  /// Map a case from any domain into the common schema.
  ///
  /// The domain's own descriptive field lands in `Cause`; columns the
  /// domain does not carry are blank. `court` fills the constant `Court`
  /// column.
  pub fn project(record: &CaseRecord, court: &str) -> Self {
    let fields = record.fields();
    let mut row = Row::new();
    put(&mut row, field::COUNTY, record.county.as_ref());
    put(&mut row, field::CAUSE_NUMBER, &record.cause_number);
    put(&mut row, field::FILE_DATE, &record.file_date);
    put(&mut row, field::DOCKET_DATE, &record.docket_date.to_cell());
    put(&mut row, field::COURT, court);
    put(&mut row, field::CAUSE, fields.cause());
    put(&mut row, field::DOCKET_TYPE, fields.docket_type());
    put(&mut row, field::ANS_FILE, fields.ans_file());
    put(&mut row, field::CR_NUMBER, fields.cr_number());
    put(&mut row, field::CASE_TYPE, record.case_type.as_ref());
    put(&mut row, field::STATUS, record.status.as_ref());
    put(
      &mut row,
      field::OUTSTANDING_WARRANTS,
      fields.outstanding_warrants(),
    );
    put(&mut row, field::ST_RPT_COLUMN, fields.st_rpt_column());
    put(
      &mut row,
      field::REPORT_GENERATED_DATE,
      &record.report_generated_date,
    );
    put(
      &mut row,
      field::ORIGINAL_AS_OF_DATE,
      &as_of_cell(record.original_as_of),
    );
    put(&mut row, field::LAST_AS_OF_DATE, &as_of_cell(record.last_as_of));
    put(&mut row, field::LOAD_DATETIME, &load_cell(record.load_datetime));
    put(
      &mut row,
      field::DROPPED_DATETIME,
      &dropped_cell(record.dropped_at),
    );

    let d = &record.disposition;
    put(&mut row, field::DISPOSED_DATES, &d.dates.to_cell());
    put(&mut row, field::DISPOSITIONS, &d.descriptions.to_cell());
    put(&mut row, field::DISPOSED_AS_OF_DATE, &as_of_cell(d.as_of));
    let count = if record.status.is_closed() {
      d.count.to_string()
    } else {
      "0".to_string()
    };
    put(&mut row, field::NUMBER_OF_DISPOSITIONS, &count);

    Self {
      county: record.county,
      cause_number: record.cause_number.clone(),
      status: record.status,
      load_datetime: record.load_datetime,
      cells: row,
    }
  }

  pub fn from_row(row: &Row) -> Result<Self> {
    let status_cell = cell(row, field::STATUS).trim();
    Ok(Self {
      county:        County::from_cell(cell(row, field::COUNTY)),
      cause_number:  cell(row, field::CAUSE_NUMBER).trim().to_string(),
      status:        status_cell
        .parse()
        .map_err(|_| Error::field(field::STATUS, status_cell))?,
      load_datetime: LoadStamp::parse_cell(cell(row, field::LOAD_DATETIME))?,
      cells:         shape(COMMON, row),
    })
  }

  pub fn get(&self, column: &str) -> &str { cell(&self.cells, column) }

  pub fn to_row(&self) -> Row { self.cells.clone() }

  pub fn key(&self) -> (County, &str) { (self.county, &self.cause_number) }
}
