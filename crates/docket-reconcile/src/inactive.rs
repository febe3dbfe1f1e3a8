//! Inactive-report reconciliation.
//!
//! Each inactive table tracks an Active/Inactive sub-status per cause
//! number. A case listed on the report is Inactive; a tracked case of the
//! same county that is no longer listed has come back to Active.

use std::collections::{HashMap, HashSet};

use docket_core::{
  inactive::{InactiveCase, InactiveStatus},
  report::County,
  table::{TableId, shape},
};

use crate::{
  Counts,
  merge::{Ctx, TableWrite},
};

pub(crate) struct InactivePlan {
  pub writes: Vec<TableWrite>,
  pub counts: Counts,
}

fn owned_key(case: &InactiveCase) -> (County, String) {
  let (county, cause) = case.key();
  (county, cause.to_string())
}

pub(crate) fn reconcile(
  ctx: &Ctx<'_>,
  table: TableId,
  incoming: Vec<InactiveCase>,
  stored: Vec<InactiveCase>,
) -> InactivePlan {
  let mut counts = Counts::default();
  let as_of = ctx.as_of.to_string();

  let scope: HashSet<County> = std::iter::once(ctx.county)
    .chain(incoming.iter().map(|c| c.county))
    .collect();
  let mut reported: HashMap<(County, String), InactiveCase> = HashMap::new();
  let mut order = Vec::new();
  for case in incoming {
    let key = owned_key(&case);
    if !reported.contains_key(&key) {
      order.push(key.clone());
    }
    reported.insert(key, case);
  }

  let mut rows = Vec::with_capacity(stored.len() + order.len());
  for mut case in stored {
    if !scope.contains(&case.county) {
      rows.push(case);
      continue;
    }
    match (reported.remove(&owned_key(&case)), case.status) {
      (Some(listed), InactiveStatus::Active) => {
        case.status = InactiveStatus::Inactive;
        case.original_as_of.prepend(as_of.as_str());
        case.last_as_of.prepend(as_of.as_str());
        refresh(&mut case, listed, ctx);
        counts.inactivated += 1;
      }
      (Some(listed), InactiveStatus::Inactive) => {
        case.last_as_of.replace_latest(as_of.as_str());
        refresh(&mut case, listed, ctx);
        counts.continued += 1;
      }
      (None, InactiveStatus::Inactive) => {
        case.status = InactiveStatus::Active;
        case.estimated_end.prepend(as_of.as_str());
        case.load_datetime = Some(ctx.stamp);
        counts.reactivated += 1;
      }
      (None, InactiveStatus::Active) => {}
    }
    rows.push(case);
  }

  for key in order {
    if let Some(case) = reported.remove(&key) {
      counts.inactivated += 1;
      rows.push(case);
    }
  }

  let rows = rows
    .iter()
    .map(|c| shape(table.header(), &c.to_row()))
    .collect();
  InactivePlan {
    writes: vec![TableWrite::overwrite(table, rows)],
    counts,
  }
}

/// Take the report's view of the current inactive period.
fn refresh(case: &mut InactiveCase, listed: InactiveCase, ctx: &Ctx<'_>) {
  case.file_date = listed.file_date;
  case.case_type = listed.case_type;
  case.inactive_starts = listed.inactive_starts;
  case.inactive_ends = listed.inactive_ends;
  case.inactive_reasons = listed.inactive_reasons;
  case.load_datetime = Some(ctx.stamp);
}
