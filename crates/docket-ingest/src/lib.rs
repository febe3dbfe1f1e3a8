//! Record normalizer for parsed court-clerk reports.
//!
//! Takes the flat rows produced by a report parser together with the header
//! facts sniffed from the report, and produces typed [`docket_core`] records
//! ready for reconciliation. Pure synchronous; no store access.
//!
//! # Quick start
//!
//! ```no_run
//! use docket_core::{
//!   date::LoadStamp,
//!   report::{County, ReportCategory, ReportHeader},
//! };
//! use docket_ingest::{RawRecord, normalize};
//!
//! let header = ReportHeader {
//!   category:       Some(ReportCategory::Civil),
//!   county:         County::Dimmit,
//!   district_court: true,
//!   as_of_date:     "04/15/2024".into(),
//!   source_label:   "dimmit_civil.pdf".into(),
//! };
//! let rows: Vec<RawRecord> = Vec::new();
//! let offset = chrono::FixedOffset::west_opt(6 * 3600).unwrap();
//! let normalized = normalize(&header, &rows, LoadStamp::now(&offset)).unwrap();
//! println!("{} rows", normalized.report.len());
//! ```

pub mod classify;
pub mod error;
mod normalize;
mod raw;

pub use error::{Error, Result};
pub use normalize::{
  Normalized, NormalizedReport, RowWarning, WarningKind, normalize,
};
pub use raw::{RawRecord, RawValue, ReportFile};
