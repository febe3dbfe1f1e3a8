//! Disposed-report reconciliation.
//!
//! A disposed report only ever touches the closed archive and the common
//! table. The open table is left to the next pending report, which drops the
//! case and finds the disposition already filed.

use docket_core::case::{CaseRecord, CaseStatus};

use crate::{
  Counts,
  merge::{Archive, CommonBook, TableWrite, dedupe_keep_last},
};

pub(crate) struct DisposedPlan {
  pub writes: Vec<TableWrite>,
  pub counts: Counts,
}

pub(crate) fn reconcile(
  incoming: Vec<CaseRecord>,
  mut archive: Archive,
  mut common: CommonBook,
) -> DisposedPlan {
  let mut counts = Counts::default();
  for record in dedupe_keep_last(incoming) {
    let disposal = archive.file_disposed(record);
    if disposal.previous != Some(CaseStatus::Disposed) {
      counts.disposed += 1;
    }
    common.sync_archived(&disposal.record, false);
  }

  let mut writes = Vec::new();
  writes.extend(archive.into_write());
  writes.extend(common.into_write());
  DisposedPlan { writes, counts }
}
