//! Juvenile-report reconciliation.
//!
//! A juvenile report lists open and disposed cases together, so one report
//! both refreshes the open table and files dispositions. Cases that were
//! open in a county the report covers and appear in neither list are
//! inferred dropped.

use std::collections::{HashMap, HashSet};

use docket_core::{
  case::{CaseRecord, CaseStatus},
  report::County,
  table::TableId,
};

use crate::{
  Counts,
  merge::{
    Archive, CommonBook, Ctx, Key, TableWrite, carry_forward, case_rows,
    dedupe_keep_last, drop_case, key_of,
  },
};

pub(crate) struct JuvenilePlan {
  pub writes: Vec<TableWrite>,
  pub counts: Counts,
}

pub(crate) fn reconcile(
  ctx: &Ctx<'_>,
  open_in: Vec<CaseRecord>,
  disposed_in: Vec<CaseRecord>,
  open: Vec<CaseRecord>,
  mut archive: Archive,
  mut common: CommonBook,
) -> JuvenilePlan {
  let mut counts = Counts::default();
  let disposed_in = dedupe_keep_last(disposed_in);
  let disposed_keys: HashSet<Key> = disposed_in.iter().map(key_of).collect();
  // A case listed under both headings is treated as disposed.
  let open_in: Vec<CaseRecord> = dedupe_keep_last(open_in)
    .into_iter()
    .filter(|r| !disposed_keys.contains(&key_of(r)))
    .collect();

  let scope: HashSet<County> = std::iter::once(ctx.county)
    .chain(open_in.iter().map(|r| r.county))
    .chain(disposed_in.iter().map(|r| r.county))
    .collect();
  let reported: HashSet<Key> = open_in
    .iter()
    .map(key_of)
    .chain(disposed_keys.iter().cloned())
    .collect();

  let mut others = Vec::new();
  let mut stored: HashMap<Key, CaseRecord> = HashMap::new();
  let mut closed = Vec::new();
  for row in dedupe_keep_last(open) {
    if !scope.contains(&row.county) {
      others.push(row);
    } else if reported.contains(&key_of(&row)) {
      stored.insert(key_of(&row), row);
    } else {
      closed.push(row);
    }
  }

  let still_open: Vec<CaseRecord> = open_in
    .into_iter()
    .map(|row| match stored.get(&key_of(&row)) {
      Some(existing) => {
        counts.continued += 1;
        carry_forward(existing, row)
      }
      None => {
        match archive.get(&key_of(&row)).map(|r| r.status) {
          Some(CaseStatus::Dropped) => counts.reopened += 1,
          _ => counts.opened += 1,
        }
        row
      }
    })
    .collect();

  let mut archived = Vec::new();
  for row in disposed_in {
    let key = key_of(&row);
    let previous = archive.get(&key).cloned();
    let row = match stored.get(&key).or(previous.as_ref()) {
      Some(existing) => carry_forward(existing, row),
      None => row,
    };
    if previous.map(|p| p.status) != Some(CaseStatus::Disposed) {
      counts.disposed += 1;
    }
    archived.push(archive.file(row));
  }
  for row in closed {
    archived.push(archive.file_dropped(drop_case(row, ctx)));
    counts.dropped += 1;
  }

  let mut table_rows = others;
  table_rows.extend(still_open);

  for row in &table_rows {
    common.upsert_open(row);
  }
  for row in &archived {
    common.sync_archived(row, true);
  }

  let mut writes = Vec::new();
  writes.extend(archive.into_write());
  writes.push(TableWrite::overwrite(
    TableId::JuvenileCases,
    case_rows(TableId::JuvenileCases, &table_rows),
  ));
  writes.extend(common.into_write());

  JuvenilePlan { writes, counts }
}
