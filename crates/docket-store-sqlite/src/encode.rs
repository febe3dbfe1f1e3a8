//! Encoding between table values and the JSON text stored in SQLite
//! columns.

use docket_core::table::Row;

use crate::Result;

pub fn encode_header(header: &[String]) -> Result<String> {
  Ok(serde_json::to_string(header)?)
}

pub fn decode_header(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_rows(rows: &[Row]) -> Result<Vec<String>> {
  rows
    .iter()
    .map(|r| Ok(serde_json::to_string(r)?))
    .collect()
}

pub fn decode_row(s: &str) -> Result<Row> { Ok(serde_json::from_str(s)?) }

/// SQLite integers are signed; versions never go negative.
pub fn decode_version(v: i64) -> u64 { u64::try_from(v).unwrap_or_default() }
