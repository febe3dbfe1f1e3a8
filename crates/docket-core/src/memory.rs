//! An in-memory [`TableStore`], used by tests and for dry runs.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Mutex, MutexGuard},
};

use crate::{
  store::{CellRef, TableStore, locate},
  table::{Row, Table, TableId},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: Mutex<HashMap<TableId, Table>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, HashMap<TableId, Table>> {
    // Poisoning carries no meaning for a plain map.
    self.tables.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Replace a table's contents without going through the async API.
  pub fn seed(&self, table: TableId, header: Vec<String>, rows: Vec<Row>) {
    let mut tables = self.lock();
    let entry = tables.entry(table).or_default();
    entry.header = header;
    entry.rows = rows;
    entry.version += 1;
  }

  /// Copy of a table's current contents.
  pub fn snapshot(&self, table: TableId) -> Table {
    self.lock().get(&table).cloned().unwrap_or_default()
  }
}

impl TableStore for MemoryStore {
  type Error = Infallible;

  async fn read_all(&self, table: TableId) -> Result<Table, Infallible> {
    Ok(self.snapshot(table))
  }

  async fn version(&self, table: TableId) -> Result<u64, Infallible> {
    Ok(self.lock().get(&table).map(|t| t.version).unwrap_or(0))
  }

  async fn overwrite(
    &self,
    table: TableId,
    header: Vec<String>,
    rows: Vec<Row>,
  ) -> Result<u64, Infallible> {
    let mut tables = self.lock();
    let entry = tables.entry(table).or_default();
    entry.header = header;
    entry.rows = rows;
    entry.version += 1;
    Ok(entry.version)
  }

  async fn append_at_first_free_row(
    &self,
    table: TableId,
    header: Vec<String>,
    rows: Vec<Row>,
  ) -> Result<u64, Infallible> {
    let mut tables = self.lock();
    let entry = tables.entry(table).or_default();
    if entry.header.is_empty() && entry.rows.is_empty() {
      entry.header = header;
    }
    entry.rows.extend(rows);
    entry.version += 1;
    Ok(entry.version)
  }

  async fn find_cell(
    &self,
    table: TableId,
    value: String,
  ) -> Result<Option<CellRef>, Infallible> {
    Ok(self.lock().get(&table).and_then(|t| locate(t, &value)))
  }
}
