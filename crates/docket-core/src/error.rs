//! Error types for `docket-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid value for {field:?}: {value:?}")]
  InvalidField { field: &'static str, value: String },

  #[error("unparseable as-of date: {0:?}")]
  InvalidAsOfDate(String),

  #[error("unparseable load timestamp: {0:?}")]
  InvalidLoadStamp(String),

  #[error("unknown table: {0:?}")]
  UnknownTable(String),
}

impl Error {
  pub(crate) fn field(field: &'static str, value: impl Into<String>) -> Self {
    Self::InvalidField { field, value: value.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
