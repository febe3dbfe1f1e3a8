//! Reconciliation engine for court-clerk case reports.
//!
//! Folds normalized reports into the stored case tables through the
//! [`TableStore`](docket_core::store::TableStore) contract: the open table
//! for each case type, its closed archive, the inactive tables, the
//! cross-domain common table and the report tracker.
//!
//! [`process_batch`] is the entry point for a set of uploaded reports; it
//! runs the freshness gate, then hands each admitted report to a
//! [`Reconciler`].

pub mod batch;
mod disposed;
pub mod engine;
pub mod error;
pub mod gate;
mod inactive;
mod juvenile;
mod merge;
mod pending;
pub mod tracker;


pub use batch::{BatchOutcome, ReportOutcome, ReportResult, process_batch};
pub use engine::{Counts, Reconciler, Settings, Summary};
pub use error::{Error, Result};
