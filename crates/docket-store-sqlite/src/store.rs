//! [`SqliteStore`], the SQLite implementation of [`TableStore`].

use std::path::Path;

use docket_core::{
  store::{CellRef, TableStore, locate},
  table::{Row, Table, TableId},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{decode_header, decode_row, decode_version, encode_header, encode_rows},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A table store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Create the sheet row if missing and bump its version. Returns the new
/// version.
fn bump(
  tx: &rusqlite::Transaction<'_>,
  name: &str,
  header_json: Option<&str>,
) -> rusqlite::Result<i64> {
  tx.execute(
    "INSERT INTO sheets (name, header_json, version) VALUES (?1, ?2, 1)
     ON CONFLICT(name) DO UPDATE SET
       header_json = COALESCE(?3, header_json),
       version     = version + 1",
    rusqlite::params![name, header_json.unwrap_or("[]"), header_json],
  )?;
  tx.query_row(
    "SELECT version FROM sheets WHERE name = ?1",
    rusqlite::params![name],
    |r| r.get(0),
  )
}

fn insert_rows(
  tx: &rusqlite::Transaction<'_>,
  name: &str,
  start: i64,
  rows: &[String],
) -> rusqlite::Result<()> {
  let mut stmt = tx.prepare(
    "INSERT INTO sheet_rows (name, position, row_json) VALUES (?1, ?2, ?3)",
  )?;
  for (offset, row) in (0_i64..).zip(rows) {
    stmt.execute(rusqlite::params![name, start + offset, row])?;
  }
  Ok(())
}

// ─── TableStore impl ─────────────────────────────────────────────────────────

impl TableStore for SqliteStore {
  type Error = crate::Error;

  async fn read_all(&self, table: TableId) -> Result<Table> {
    let name = table.to_string();

    let (sheet, raw_rows): (Option<(String, i64)>, Vec<String>) = self
      .conn
      .call(move |conn| {
        let sheet = conn
          .query_row(
            "SELECT header_json, version FROM sheets WHERE name = ?1",
            rusqlite::params![name],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let mut stmt = conn.prepare(
          "SELECT row_json FROM sheet_rows WHERE name = ?1 ORDER BY position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![name], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok((sheet, rows))
      })
      .await?;

    let Some((header_json, version)) = sheet else {
      return Ok(Table::default());
    };
    Ok(Table {
      header:  decode_header(&header_json)?,
      rows:    raw_rows
        .iter()
        .map(|r| decode_row(r))
        .collect::<Result<Vec<Row>>>()?,
      version: decode_version(version),
    })
  }

  async fn version(&self, table: TableId) -> Result<u64> {
    let name = table.to_string();
    let version: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT version FROM sheets WHERE name = ?1",
              rusqlite::params![name],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(version.map(decode_version).unwrap_or(0))
  }

  async fn overwrite(
    &self,
    table: TableId,
    header: Vec<String>,
    rows: Vec<Row>,
  ) -> Result<u64> {
    let name = table.to_string();
    let header_json = encode_header(&header)?;
    let rows_json = encode_rows(&rows)?;

    let version = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let version = bump(&tx, &name, Some(&header_json))?;
        tx.execute(
          "DELETE FROM sheet_rows WHERE name = ?1",
          rusqlite::params![name],
        )?;
        insert_rows(&tx, &name, 0, &rows_json)?;
        tx.commit()?;
        Ok(version)
      })
      .await?;
    Ok(decode_version(version))
  }

  async fn append_at_first_free_row(
    &self,
    table: TableId,
    header: Vec<String>,
    rows: Vec<Row>,
  ) -> Result<u64> {
    let name = table.to_string();
    let header_json = encode_header(&header)?;
    let rows_json = encode_rows(&rows)?;

    let version = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(position) + 1, 0) FROM sheet_rows WHERE name = ?1",
          rusqlite::params![name],
          |r| r.get(0),
        )?;
        let stored_header: Option<String> = tx
          .query_row(
            "SELECT header_json FROM sheets WHERE name = ?1",
            rusqlite::params![name],
            |r| r.get(0),
          )
          .optional()?;
        // Only an empty table takes the caller's header.
        let empty = next == 0
          && stored_header.as_deref().is_none_or(|h| h == "[]");
        let version =
          bump(&tx, &name, empty.then_some(header_json.as_str()))?;
        insert_rows(&tx, &name, next, &rows_json)?;
        tx.commit()?;
        Ok(version)
      })
      .await?;
    Ok(decode_version(version))
  }

  async fn find_cell(
    &self,
    table: TableId,
    value: String,
  ) -> Result<Option<CellRef>> {
    let snapshot = self.read_all(table).await?;
    Ok(locate(&snapshot, &value))
  }
}
