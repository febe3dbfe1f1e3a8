//! SQL schema for the docket SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per named table. `version` is bumped by every write.
CREATE TABLE IF NOT EXISTS sheets (
    name        TEXT PRIMARY KEY,
    header_json TEXT NOT NULL,      -- JSON array of column names
    version     INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS sheet_rows (
    name     TEXT NOT NULL REFERENCES sheets(name),
    position INTEGER NOT NULL,      -- 0-based, dense
    row_json TEXT NOT NULL,         -- JSON object, column name -> cell text
    PRIMARY KEY (name, position)
);

PRAGMA user_version = 1;
";
