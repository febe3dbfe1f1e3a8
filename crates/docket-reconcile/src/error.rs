//! Error types for the reconciliation engine.

use docket_core::table::TableId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("stored data error: {0}")]
  Core(#[from] docket_core::Error),

  #[error("report error: {0}")]
  Ingest(#[from] docket_ingest::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Another writer changed a table between our read and our first write.
  #[error("table {table} changed during reconciliation (read v{read}, now v{now})")]
  StaleSnapshot { table: TableId, read: u64, now: u64 },
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
