//! SQLite backend for the docket table store.
//!
//! Each named table is a header plus an ordered list of rows, stored as
//! JSON so the store stays as schema-less as the spreadsheet it stands in
//! for. Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
