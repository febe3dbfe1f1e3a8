//! `docket`: operator tool for the docket table store.
//!
//! Reads `docket.toml` (or the path given with `--config`) layered under
//! `DOCKET_*` environment variables, opens the SQLite store, and runs one
//! subcommand.
//!
//! # Usage
//!
//! ```text
//! docket ingest dimmit_civil.json dimmit_criminal.json
//! docket tracker
//! docket show "Closed Civil Cases"
//! docket find "Common Table" 24-01-00001-CV
//! ```
//!
//! Report files are the parser's JSON output: a `header` object and a
//! `rows` array.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use docket_core::{
  date::{LoadStamp, load_cell},
  store::TableStore,
  table::TableId,
};
use docket_ingest::ReportFile;
use docket_reconcile::{ReportOutcome, process_batch, tracker::TrackerBook};
use docket_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "docket", version, about = "Court-clerk report reconciliation")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "docket.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Reconcile one upload session of parsed report files.
  Ingest {
    /// JSON report files, processed in the order given.
    #[arg(required = true)]
    files: Vec<PathBuf>,
  },
  /// Print the last accepted as-of date per county and report type.
  Tracker,
  /// Dump a table as JSON lines.
  Show {
    /// Table name, e.g. "Civil Cases".
    table: String,
  },
  /// Locate the first cell equal to VALUE (1-based; row 1 is the header).
  Find { table: String, value: String },
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path:         PathBuf,
  /// Reference timezone for `Load DateTime`, e.g. `America/Chicago`.
  #[serde(default = "default_timezone")]
  timezone:           Tz,
  #[serde(flatten)]
  engine:             docket_reconcile::Settings,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/docket/docket.db") }

fn default_timezone() -> Tz { Tz::America__Chicago }

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings: Settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DOCKET"))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")?;

  let store_path = expand_tilde(&settings.store_path);
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Ingest { files } => ingest(&store, &settings, &files).await,
    Command::Tracker => tracker(&store).await,
    Command::Show { table } => show(&store, parse_table(&table)?).await,
    Command::Find { table, value } => {
      let table = parse_table(&table)?;
      match store.find_cell(table, value.clone()).await? {
        Some(at) => println!("{table}: row {}, column {}", at.row, at.column),
        None => println!("{value:?} not found in {table}"),
      }
      Ok(())
    }
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn ingest(
  store: &SqliteStore,
  settings: &Settings,
  paths: &[PathBuf],
) -> anyhow::Result<()> {
  let mut files = Vec::with_capacity(paths.len());
  for path in paths {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading report file {}", path.display()))?;
    let file = ReportFile::from_json(&raw)
      .with_context(|| format!("parsing report file {}", path.display()))?;
    files.push(file);
  }

  let stamp = LoadStamp::now(&settings.timezone);
  let outcome =
    process_batch(store, &settings.engine, files, stamp)
      .await
      .context("batch failed")?;

  println!("{}", serde_json::to_string_pretty(&outcome)?);

  let failed = outcome.halted.is_some()
    || outcome
      .reports
      .iter()
      .any(|r| matches!(r.outcome, ReportOutcome::Failed { .. }));
  if failed {
    anyhow::bail!(
      "session {}: {} of {} reports reconciled",
      outcome.session,
      outcome.reconciled(),
      outcome.reports.len()
    );
  }
  Ok(())
}

async fn tracker(store: &SqliteStore) -> anyhow::Result<()> {
  let table = store.read_all(TableId::ReportTracker).await?;
  let book = TrackerBook::load(&table)?;
  for entry in book.entries() {
    println!(
      "{:<10} {:<18} {}  (loaded {})",
      entry.county.as_ref(),
      entry.category.as_ref(),
      entry.report_date,
      load_cell(entry.load_datetime),
    );
  }
  Ok(())
}

async fn show(store: &SqliteStore, table: TableId) -> anyhow::Result<()> {
  let snapshot = store.read_all(table).await?;
  tracing::debug!(%table, version = snapshot.version, "read table");
  for row in &snapshot.rows {
    println!("{}", serde_json::to_string(row)?);
  }
  Ok(())
}

fn parse_table(name: &str) -> anyhow::Result<TableId> {
  name
    .parse()
    .map_err(|_| anyhow::anyhow!("unknown table {name:?}"))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
