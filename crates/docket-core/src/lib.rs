//! Core types and trait definitions for the docket reconciliation engine.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod case;
pub mod common;
pub mod date;
pub mod error;
pub mod inactive;
pub mod memory;
pub mod report;
pub mod store;
pub mod table;
pub mod tracker;

pub use error::{Error, Result};
