//! Applying one normalized report to the store.
//!
//! Reconciliation is read, plan, check, write. Every table the report needs
//! is read once and its version noted; the writes are computed purely from
//! those snapshots; every noted version is checked again; then the writes
//! go out, archive first, then the open or inactive table, then the common
//! table.

use docket_core::{
  case::CaseRecord,
  common::CommonRow,
  inactive::InactiveCase,
  store::TableStore,
  table::{Table, TableId, TablePair},
};
use docket_ingest::{Normalized, NormalizedReport};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result, disposed, inactive, juvenile,
  merge::{Archive, CommonBook, Ctx, TableWrite, WriteMode},
  pending,
};

/// Engine settings that come from configuration rather than from reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Value written to the common table's `Court` column.
  pub court: String,
}

impl Default for Settings {
  fn default() -> Self { Self { court: "293".to_string() } }
}

/// What one reconciliation did, per kind of transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
  /// Cases seen for the first time.
  pub opened:      usize,
  /// Open cases listed again.
  pub continued:   usize,
  /// Dropped cases listed as open again.
  pub reopened:    usize,
  pub dropped:     usize,
  pub disposed:    usize,
  pub inactivated: usize,
  pub reactivated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub counts:  Counts,
  /// Tables written, in write order.
  pub written: Vec<TableId>,
}

struct Plan {
  writes: Vec<TableWrite>,
  counts: Counts,
}

/// Versions of every table a plan was computed from.
#[derive(Default)]
struct Snapshot {
  versions: Vec<(TableId, u64)>,
}

pub struct Reconciler<'a, S> {
  store:    &'a S,
  settings: &'a Settings,
}

impl<'a, S: TableStore> Reconciler<'a, S> {
  pub fn new(store: &'a S, settings: &'a Settings) -> Self {
    Self { store, settings }
  }

  pub async fn reconcile(&self, report: &Normalized) -> Result<Summary> {
    let ctx = Ctx {
      county: report.county,
      as_of:  report.as_of,
      stamp:  report.stamp,
      court:  &self.settings.court,
    };
    let mut snapshot = Snapshot::default();
    let plan = self.plan(report, &ctx, &mut snapshot).await?;
    self.check(&snapshot).await?;

    let mut written = Vec::with_capacity(plan.writes.len());
    for write in plan.writes {
      tracing::debug!(
        table = %write.table,
        mode = ?write.mode,
        rows = write.rows.len(),
        "writing table"
      );
      let table = write.table;
      let result = match write.mode {
        WriteMode::Overwrite => {
          self.store.overwrite(table, write.header, write.rows).await
        }
        WriteMode::Append => {
          self
            .store
            .append_at_first_free_row(table, write.header, write.rows)
            .await
        }
      };
      result.map_err(Error::store)?;
      written.push(table);
    }

    tracing::info!(
      county = %report.county,
      category = %report.category,
      as_of = %report.as_of,
      counts = ?plan.counts,
      "report reconciled"
    );
    Ok(Summary { counts: plan.counts, written })
  }

  async fn plan(
    &self,
    report: &Normalized,
    ctx: &Ctx<'_>,
    snapshot: &mut Snapshot,
  ) -> Result<Plan> {
    let plan = match &report.report {
      NormalizedReport::Pending(rows) => {
        let pair = TablePair::for_case_type(report.route);
        let open = self.read_cases(pair.open, snapshot).await?;
        let archive = self.read_archive(pair.closed, snapshot).await?;
        let common = self.read_common(snapshot).await?;
        let p =
          pending::reconcile(ctx, pair.open, rows.clone(), open, archive, common);
        Plan { writes: p.writes, counts: p.counts }
      }
      NormalizedReport::Disposed(rows) => {
        let pair = TablePair::for_case_type(report.route);
        let archive = self.read_archive(pair.closed, snapshot).await?;
        let common = self.read_common(snapshot).await?;
        let p = disposed::reconcile(rows.clone(), archive, common);
        Plan { writes: p.writes, counts: p.counts }
      }
      NormalizedReport::Juvenile { open: listed, disposed } => {
        let open = self.read_cases(TableId::JuvenileCases, snapshot).await?;
        let archive =
          self.read_archive(TableId::ClosedJuvenileCases, snapshot).await?;
        let common = self.read_common(snapshot).await?;
        let p = juvenile::reconcile(
          ctx,
          listed.clone(),
          disposed.clone(),
          open,
          archive,
          common,
        );
        Plan { writes: p.writes, counts: p.counts }
      }
      NormalizedReport::Inactive(rows) => {
        let table = if report.category.is_criminal() {
          TableId::InactiveCriminalCases
        } else {
          TableId::InactiveCivilCases
        };
        let stored = self
          .read(table, snapshot)
          .await?
          .rows
          .iter()
          .map(InactiveCase::from_row)
          .collect::<docket_core::Result<Vec<_>>>()?;
        let p = inactive::reconcile(ctx, table, rows.clone(), stored);
        Plan { writes: p.writes, counts: p.counts }
      }
    };
    Ok(plan)
  }

  async fn read(&self, table: TableId, snapshot: &mut Snapshot) -> Result<Table> {
    let read = self.store.read_all(table).await.map_err(Error::store)?;
    snapshot.versions.push((table, read.version));
    Ok(read)
  }

  async fn read_cases(
    &self,
    table: TableId,
    snapshot: &mut Snapshot,
  ) -> Result<Vec<CaseRecord>> {
    let domain = table
      .domain()
      .ok_or_else(|| docket_core::Error::UnknownTable(table.to_string()))?;
    let read = self.read(table, snapshot).await?;
    Ok(CaseRecord::from_rows(&read.rows, domain)?)
  }

  async fn read_archive(
    &self,
    table: TableId,
    snapshot: &mut Snapshot,
  ) -> Result<Archive> {
    let rows = self.read_cases(table, snapshot).await?;
    Ok(Archive::load(table, rows))
  }

  async fn read_common(&self, snapshot: &mut Snapshot) -> Result<CommonBook> {
    let read = self.read(TableId::CommonTable, snapshot).await?;
    let rows = read
      .rows
      .iter()
      .map(CommonRow::from_row)
      .collect::<docket_core::Result<Vec<_>>>()?;
    Ok(CommonBook::load(rows, &self.settings.court))
  }

  /// Fail if any table moved since it was read.
  async fn check(&self, snapshot: &Snapshot) -> Result<()> {
    for &(table, read) in &snapshot.versions {
      let now = self.store.version(table).await.map_err(Error::store)?;
      if now != read {
        return Err(Error::StaleSnapshot { table, read, now });
      }
    }
    Ok(())
  }
}
