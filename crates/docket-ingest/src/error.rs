//! Error types for the docket-ingest normalizer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The parser produced rows that cannot have come from a well-formed
  /// report. Nothing from the report is reconciled.
  #[error("malformed report (row {row}): {reason}")]
  MalformedReport { row: usize, reason: String },

  #[error("report category could not be determined")]
  UnresolvedCategory,

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Core(#[from] docket_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
