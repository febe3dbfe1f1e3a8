//! The `TableStore` trait: the narrow storage contract the reconciliation
//! engine is written against.
//!
//! The backing store is treated as a schema-less spreadsheet. It has no
//! transactions and no per-row update, so every mutation is either a full
//! overwrite or an append after the last occupied row. Each table carries a
//! version counter that every write bumps; callers compare versions to
//! detect that a snapshot they computed from has gone stale.

use std::future::Future;

use crate::table::{Row, Table, TableId};

/// A located cell, 1-based. Row 1 is the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
  pub row:    usize,
  pub column: usize,
}

/// Abstraction over a tabular store backend.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait TableStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read a whole table. A table that was never written reads as empty with
  /// version 0.
  fn read_all(
    &self,
    table: TableId,
  ) -> impl Future<Output = Result<Table, Self::Error>> + Send + '_;

  /// Current version of a table without reading its rows.
  fn version(
    &self,
    table: TableId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Clear the table and write `header` plus `rows`. Returns the new
  /// version.
  fn overwrite(
    &self,
    table: TableId,
    header: Vec<String>,
    rows: Vec<Row>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Write `rows` after the last occupied row. When the table is empty,
  /// `header` is written first. Returns the new version.
  fn append_at_first_free_row(
    &self,
    table: TableId,
    header: Vec<String>,
    rows: Vec<Row>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Locate the first cell whose text equals `value`, scanning the header
  /// then each row left to right.
  fn find_cell(
    &self,
    table: TableId,
    value: String,
  ) -> impl Future<Output = Result<Option<CellRef>, Self::Error>> + Send + '_;
}

/// Shared `find_cell` scan over an in-memory snapshot.
pub fn locate(table: &Table, value: &str) -> Option<CellRef> {
  if let Some(column) = table.header.iter().position(|h| h == value) {
    return Some(CellRef { row: 1, column: column + 1 });
  }
  table.rows.iter().enumerate().find_map(|(i, row)| {
    table
      .header
      .iter()
      .position(|h| row.get(h).is_some_and(|v| v == value))
      .map(|column| CellRef { row: i + 2, column: column + 1 })
  })
}
