//! Pending-report reconciliation for civil and criminal open tables.

use std::collections::{HashMap, HashSet};

use docket_core::{
  case::{CaseRecord, CaseStatus},
  table::TableId,
};

use crate::{
  Counts,
  merge::{
    Archive, CommonBook, Ctx, Key, TableWrite, carry_forward, case_rows,
    dedupe_keep_last, drop_case, key_of,
  },
};

pub(crate) struct PendingPlan {
  pub writes: Vec<TableWrite>,
  pub counts: Counts,
}

/// Reconcile one county's pending report against the open table, its
/// closed archive and the common table.
///
/// Only the report county's open rows can close. Rows of other counties
/// sharing the table pass through untouched unless the report lists them,
/// in which case they merge like any other continued case.
pub(crate) fn reconcile(
  ctx: &Ctx<'_>,
  open_table: TableId,
  incoming: Vec<CaseRecord>,
  open: Vec<CaseRecord>,
  mut archive: Archive,
  mut common: CommonBook,
) -> PendingPlan {
  let mut counts = Counts::default();
  let incoming = dedupe_keep_last(incoming);
  let reported: HashSet<Key> = incoming.iter().map(key_of).collect();

  let mut others = Vec::new();
  let mut stored: HashMap<Key, CaseRecord> = HashMap::new();
  let mut closed = Vec::new();
  for row in dedupe_keep_last(open) {
    let key = key_of(&row);
    if reported.contains(&key) {
      stored.insert(key, row);
    } else if row.county != ctx.county {
      others.push(row);
    } else {
      closed.push(row);
    }
  }

  let merged: Vec<CaseRecord> = incoming
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

  let archived: Vec<CaseRecord> = closed
    .into_iter()
    .map(|row| archive.file_dropped(drop_case(row, ctx)))
    .collect();
  counts.dropped = archived.len();

  let mut table_rows = others;
  table_rows.extend(merged);
  let table_rows = dedupe_keep_last(table_rows);

  for row in &table_rows {
    common.upsert_open(row);
  }
  for row in &archived {
    common.sync_archived(row, true);
  }

  let mut writes = Vec::new();
  writes.extend(archive.into_write());
  writes.push(TableWrite::overwrite(
    open_table,
    case_rows(open_table, &table_rows),
  ));
  writes.extend(common.into_write());

  PendingPlan { writes, counts }
}

#[cfg(test)]
mod tests {
  use docket_core::{report::County, table::cell};

  use super::*;
  use crate::merge::{WriteMode, fixtures::*};

  fn run(
    as_of: &str,
    incoming: Vec<CaseRecord>,
    open: Vec<CaseRecord>,
    archive: Vec<CaseRecord>,
  ) -> PendingPlan {
    reconcile(
      &ctx(as_of),
      TableId::CivilCases,
      incoming,
      open,
      Archive::load(TableId::ClosedCivilCases, archive),
      CommonBook::load(vec![], "293"),
    )
  }

  fn write_for(plan: &PendingPlan, table: TableId) -> &TableWrite {
    plan.writes.iter().find(|w| w.table == table).unwrap()
  }

  #[test]
  fn absent_cases_close_and_present_ones_merge() {
    let open = vec![
      civil("A", "04/01/2024", "04/20/2024"),
      civil("B", "04/01/2024", "04/22/2024"),
    ];
    let incoming = vec![
      civil("B", "04/08/2024", "04/29/2024"),
      civil("C", "04/08/2024", ""),
    ];
    let plan = run("04/08/2024", incoming, open, vec![]);
    assert_eq!(plan.counts.continued, 1);
    assert_eq!(plan.counts.opened, 1);
    assert_eq!(plan.counts.dropped, 1);

    let active = write_for(&plan, TableId::CivilCases);
    let causes: Vec<&str> =
      active.rows.iter().map(|r| cell(r, "Cause Number")).collect();
    assert_eq!(causes, vec!["B", "C"]);
    assert_eq!(cell(&active.rows[0], "Original As Of Date"), "04/01/2024");
    assert_eq!(
      cell(&active.rows[0], "Docket Date"),
      "04/29/2024\n04/22/2024"
    );

    let archive = write_for(&plan, TableId::ClosedCivilCases);
    assert_eq!(archive.mode, WriteMode::Append);
    assert_eq!(cell(&archive.rows[0], "Cause Number"), "A");
    assert_eq!(cell(&archive.rows[0], "Status"), "Dropped");
    assert_eq!(
      cell(&archive.rows[0], "Dropped DateTime"),
      "2024-04-08 00:00:00"
    );
  }

  #[test]
  fn other_counties_are_not_closed() {
    let mut zavala = civil("Z", "04/01/2024", "");
    zavala.county = County::Zavala;
    let plan = run(
      "04/08/2024",
      vec![civil("A", "04/08/2024", "")],
      vec![zavala],
      vec![],
    );
    assert_eq!(plan.counts.dropped, 0);
    assert!(
      plan
        .writes
        .iter()
        .all(|w| w.table != TableId::ClosedCivilCases)
    );
    let active = write_for(&plan, TableId::CivilCases);
    assert_eq!(active.rows.len(), 2);
  }

  #[test]
  fn listed_row_from_another_county_continues_its_stored_case() {
    let mut stored = civil("X", "04/01/2024", "04/20/2024");
    stored.county = County::Zavala;
    let mut listed = civil("X", "04/08/2024", "04/29/2024");
    listed.county = County::Zavala;

    let plan = run("04/08/2024", vec![listed], vec![stored], vec![]);
    assert_eq!(plan.counts.continued, 1);
    assert_eq!(plan.counts.opened, 0);
    assert_eq!(plan.counts.dropped, 0);

    let active = write_for(&plan, TableId::CivilCases);
    assert_eq!(active.rows.len(), 1);
    assert_eq!(cell(&active.rows[0], "County"), "Zavala");
    assert_eq!(cell(&active.rows[0], "Original As Of Date"), "04/01/2024");
    assert_eq!(
      cell(&active.rows[0], "Docket Date"),
      "04/29/2024\n04/20/2024"
    );
  }

  #[test]
  fn reappearing_dropped_case_counts_as_reopened() {
    let archive = vec![drop_case(
      civil("A", "04/01/2024", ""),
      &ctx("04/08/2024"),
    )];
    let plan = run(
      "04/15/2024",
      vec![civil("A", "04/15/2024", "")],
      vec![],
      archive,
    );
    assert_eq!(plan.counts.reopened, 1);
    assert_eq!(plan.counts.opened, 0);

    let common = write_for(&plan, TableId::CommonTable);
    let statuses: Vec<&str> =
      common.rows.iter().map(|r| cell(r, "Status")).collect();
    assert_eq!(statuses, vec!["Open"]);
  }
}
