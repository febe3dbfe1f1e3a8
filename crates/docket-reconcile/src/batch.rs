//! Processing a batch of uploaded reports.
//!
//! The freshness gate runs over the whole batch before any table is
//! touched. Admitted reports are then normalized and reconciled one at a
//! time, and the tracker is rewritten after each success so a later failure
//! never loses the record of an earlier report.

use docket_core::{
  date::LoadStamp,
  store::TableStore,
  table::{TableId, header_vec},
};
use docket_ingest::{ReportFile, RowWarning, normalize};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
  Error, Result,
  engine::{Counts, Reconciler, Settings},
  gate::{Admitted, BatchRejection, Rejection, admit, check_batch},
  tracker::TrackerBook,
};

/// What happened to one report of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReportOutcome {
  Reconciled {
    counts:   Counts,
    warnings: Vec<RowWarning>,
  },
  Rejected {
    #[serde(flatten)]
    rejection: Rejection,
  },
  /// The report passed the gate but could not be applied.
  Failed { error: String },
  /// Skipped because the batch halted or an earlier report failed to write.
  NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportResult {
  /// The report's source label.
  pub label:   String,
  #[serde(flatten)]
  pub outcome: ReportOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
  /// Identifies this run in logs.
  pub session: Uuid,
  /// Set when a batch-level check stopped every report.
  pub halted:  Option<BatchRejection>,
  pub reports: Vec<ReportResult>,
}

impl BatchOutcome {
  pub fn reconciled(&self) -> usize {
    self
      .reports
      .iter()
      .filter(|r| matches!(r.outcome, ReportOutcome::Reconciled { .. }))
      .count()
  }
}

/// Gate, normalize and reconcile every report in `files`.
///
/// Per-report problems are recorded in the outcome. Only a failure to read
/// the tracker is returned as an error.
pub async fn process_batch<S: TableStore>(
  store: &S,
  settings: &Settings,
  files: Vec<ReportFile>,
  stamp: LoadStamp,
) -> Result<BatchOutcome> {
  let session = Uuid::new_v4();
  let span = tracing::info_span!("batch", %session, reports = files.len());
  run(store, settings, files, stamp, session)
    .instrument(span)
    .await
}

async fn run<S: TableStore>(
  store: &S,
  settings: &Settings,
  files: Vec<ReportFile>,
  stamp: LoadStamp,
  session: Uuid,
) -> Result<BatchOutcome> {
  let table = store
    .read_all(TableId::ReportTracker)
    .await
    .map_err(Error::store)?;
  let mut tracker = TrackerBook::load(&table)?;

  let mut outcomes: Vec<Option<ReportOutcome>> = vec![None; files.len()];
  let mut admitted: Vec<(usize, Admitted)> = Vec::new();
  for (i, file) in files.iter().enumerate() {
    match admit(&file.header, &tracker) {
      Ok(a) => admitted.push((i, a)),
      Err(rejection) => {
        tracing::warn!(
          label = %file.header.source_label,
          %rejection,
          "report rejected"
        );
        outcomes[i] = Some(ReportOutcome::Rejected { rejection });
      }
    }
  }

  let gate: Vec<Admitted> = admitted.iter().map(|(_, a)| *a).collect();
  let halted = check_batch(&gate, &tracker).err();
  if let Some(rejection) = &halted {
    tracing::warn!(%rejection, "batch halted");
    admitted.clear();
  }

  let reconciler = Reconciler::new(store, settings);
  let mut aborted = halted.is_some();
  for (i, a) in admitted {
    if aborted {
      break;
    }
    let file = &files[i];
    let normalized = match normalize(&file.header, &file.rows, stamp) {
      Ok(n) => n,
      Err(e) => {
        tracing::warn!(label = %file.header.source_label, error = %e, "report failed");
        outcomes[i] = Some(ReportOutcome::Failed { error: e.to_string() });
        continue;
      }
    };

    let applied = async {
      let summary = reconciler.reconcile(&normalized).await?;
      tracker.record(a.county, a.category, a.as_of, stamp);
      write_tracker(store, &mut tracker).await?;
      Ok::<_, Error>(summary)
    }
    .await;

    match applied {
      Ok(summary) => {
        outcomes[i] = Some(ReportOutcome::Reconciled {
          counts:   summary.counts,
          warnings: normalized.warnings,
        });
      }
      Err(e) => {
        tracing::error!(label = %file.header.source_label, error = %e, "report failed");
        outcomes[i] = Some(ReportOutcome::Failed { error: e.to_string() });
        // The store is in an unknown state for this report; stop here.
        aborted = true;
      }
    }
  }

  let reports = files
    .iter()
    .zip(outcomes)
    .map(|(file, outcome)| ReportResult {
      label:   file.header.source_label.clone(),
      outcome: outcome.unwrap_or(ReportOutcome::NotAttempted),
    })
    .collect();
  Ok(BatchOutcome { session, halted, reports })
}

async fn write_tracker<S: TableStore>(
  store: &S,
  tracker: &mut TrackerBook,
) -> Result<()> {
  let table = TableId::ReportTracker;
  let now = store.version(table).await.map_err(Error::store)?;
  if now != tracker.version() {
    return Err(Error::StaleSnapshot { table, read: tracker.version(), now });
  }
  let version = store
    .overwrite(table, header_vec(table.header()), tracker.rows())
    .await
    .map_err(Error::store)?;
  tracker.set_version(version);
  Ok(())
}
