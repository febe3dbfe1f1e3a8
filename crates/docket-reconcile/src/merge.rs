//! Merge primitives shared by every reconciliation path.
//!
//! Precedence is explicit here rather than implied by append order:
//! incoming report data wins over stored data field by field, except for the
//! carry-forward fields (`Original As Of Date`, `Docket Date` history).

use std::collections::{HashMap, HashSet};

use docket_core::{
  case::{CaseRecord, CaseStatus},
  common::CommonRow,
  date::{AsOfDate, LoadStamp},
  report::County,
  table::{Row, TableId, header_vec, shape},
};

pub(crate) type Key = (County, String);

pub(crate) fn key_of(record: &CaseRecord) -> Key {
  let (county, cause) = record.key();
  (county, cause.to_string())
}

/// Per-report facts every path stamps onto the rows it touches.
#[derive(Debug, Clone)]
pub(crate) struct Ctx<'a> {
  pub county: County,
  pub as_of:  AsOfDate,
  pub stamp:  LoadStamp,
  pub court:  &'a str,
}

// ─── Record-level merges ─────────────────────────────────────────────────────

/// Keep only the last occurrence of each case, at that occurrence's
/// position.
pub(crate) fn dedupe_keep_last(rows: Vec<CaseRecord>) -> Vec<CaseRecord> {
  let mut seen = HashSet::new();
  let mut kept: Vec<CaseRecord> = rows
    .into_iter()
    .rev()
    .filter(|r| seen.insert(key_of(r)))
    .collect();
  kept.reverse();
  kept
}

/// Fold a stored row's history into the incoming version of the same case.
pub(crate) fn carry_forward(
  stored: &CaseRecord,
  mut incoming: CaseRecord,
) -> CaseRecord {
  if stored.original_as_of.is_some() {
    incoming.original_as_of = stored.original_as_of;
  }
  incoming.docket_date = stored.docket_date.merged_with(&incoming.docket_date);
  incoming
}

/// Turn an open case into its dropped archive form.
pub(crate) fn drop_case(mut record: CaseRecord, ctx: &Ctx<'_>) -> CaseRecord {
  record.status = CaseStatus::Dropped;
  record.dropped_at = Some(ctx.as_of.midnight());
  record.load_datetime = Some(ctx.stamp);
  record.disposition = Default::default();
  record
}

/// Ordering used to pick the surviving archive row when a case appears more
/// than once: latest load time, then a disposition over a drop. Remaining
/// ties go to the later row.
fn archive_rank(record: &CaseRecord) -> (Option<LoadStamp>, u8) {
  (record.load_datetime, record.status.terminal_rank())
}

/// Collapse an archive to one row per case. Returns whether anything was
/// removed.
pub(crate) fn collapse_archive(rows: Vec<CaseRecord>) -> (Vec<CaseRecord>, bool) {
  let mut best: HashMap<Key, usize> = HashMap::new();
  for (i, row) in rows.iter().enumerate() {
    let key = key_of(row);
    match best.get(&key) {
      Some(&j) if archive_rank(&rows[j]) > archive_rank(row) => {}
      _ => {
        best.insert(key, i);
      }
    }
  }
  let winners: HashSet<usize> = best.into_values().collect();
  let before = rows.len();
  let kept: Vec<CaseRecord> = rows
    .into_iter()
    .enumerate()
    .filter(|(i, _)| winners.contains(i))
    .map(|(_, r)| r)
    .collect();
  let collapsed = kept.len() != before;
  (kept, collapsed)
}

// ─── Table writes ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WriteMode {
  Overwrite,
  Append,
}

/// One fully computed table write.
#[derive(Debug, Clone)]
pub(crate) struct TableWrite {
  pub table:  TableId,
  pub mode:   WriteMode,
  pub header: Vec<String>,
  pub rows:   Vec<Row>,
}

impl TableWrite {
  pub fn overwrite(table: TableId, rows: Vec<Row>) -> Self {
    Self {
      table,
      mode: WriteMode::Overwrite,
      header: header_vec(table.header()),
      rows,
    }
  }

  pub fn append(table: TableId, rows: Vec<Row>) -> Self {
    Self {
      table,
      mode: WriteMode::Append,
      header: header_vec(table.header()),
      rows,
    }
  }
}

pub(crate) fn case_rows(table: TableId, records: &[CaseRecord]) -> Vec<Row> {
  records
    .iter()
    .map(|r| shape(table.header(), &r.to_row()))
    .collect()
}

// ─── Archive ─────────────────────────────────────────────────────────────────

/// A closed-case archive held in memory: one row per case.
///
/// Tracks whether the stored table can be extended with an append or must
/// be rewritten.
#[derive(Debug, Clone)]
pub(crate) struct Archive {
  table:   TableId,
  rows:    Vec<CaseRecord>,
  index:   HashMap<Key, usize>,
  /// Rows already in the store.
  stored:  usize,
  rewrite: bool,
}

impl Archive {
  pub fn load(table: TableId, rows: Vec<CaseRecord>) -> Self {
    let (rows, collapsed) = collapse_archive(rows);
    let index = rows
      .iter()
      .enumerate()
      .map(|(i, r)| (key_of(r), i))
      .collect();
    Self {
      table,
      stored: rows.len(),
      rows,
      index,
      rewrite: collapsed,
    }
  }

  pub fn get(&self, key: &Key) -> Option<&CaseRecord> {
    self.index.get(key).map(|&i| &self.rows[i])
  }

  pub fn rows(&self) -> &[CaseRecord] { &self.rows }

  fn push(&mut self, record: CaseRecord) {
    self.index.insert(key_of(&record), self.rows.len());
    self.rows.push(record);
  }

  fn replace(&mut self, i: usize, record: CaseRecord) {
    if self.rows[i] != record {
      self.rows[i] = record;
      self.rewrite = true;
    }
  }

  /// File a case that left the open table without a disposition. An
  /// existing disposition is terminal and is kept. Returns the row the
  /// archive now holds for the case.
  pub fn file_dropped(&mut self, record: CaseRecord) -> CaseRecord {
    match self.index.get(&key_of(&record)).copied() {
      Some(i) if self.rows[i].status == CaseStatus::Disposed => {
        self.rows[i].clone()
      }
      Some(i) => {
        self.replace(i, record.clone());
        record
      }
      None => {
        self.push(record.clone());
        record
      }
    }
  }

  /// File a disposition from a disposed report.
  ///
  /// A case already archived keeps its row and only takes the status and
  /// disposition columns. A case never archived is inserted as reported,
  /// with both as-of dates set to the disposition's as-of date.
  pub fn file_disposed(&mut self, record: CaseRecord) -> Disposal {
    match self.index.get(&key_of(&record)).copied() {
      Some(i) => {
        let previous = self.rows[i].status;
        let mut updated = self.rows[i].clone();
        updated.status = CaseStatus::Disposed;
        updated.disposition = record.disposition;
        self.replace(i, updated.clone());
        Disposal { record: updated, previous: Some(previous) }
      }
      None => {
        let mut inserted = record;
        inserted.status = CaseStatus::Disposed;
        if let Some(as_of) = inserted.disposition.as_of {
          inserted.original_as_of = Some(as_of);
          inserted.last_as_of = Some(as_of);
        }
        self.push(inserted.clone());
        Disposal { record: inserted, previous: None }
      }
    }
  }

  /// Replace-or-insert a juvenile archive row; dispositions stay terminal
  /// against a later inferred drop.
  pub fn file(&mut self, record: CaseRecord) -> CaseRecord {
    if record.status == CaseStatus::Dropped {
      return self.file_dropped(record);
    }
    match self.index.get(&key_of(&record)).copied() {
      Some(i) => {
        self.replace(i, record.clone());
        record
      }
      None => {
        self.push(record.clone());
        record
      }
    }
  }

  /// The write this archive needs, if any.
  pub fn into_write(self) -> Option<TableWrite> {
    if self.rewrite {
      Some(TableWrite::overwrite(
        self.table,
        case_rows(self.table, &self.rows),
      ))
    } else if self.rows.len() > self.stored {
      Some(TableWrite::append(
        self.table,
        case_rows(self.table, &self.rows[self.stored..]),
      ))
    } else {
      None
    }
  }
}

/// Outcome of filing a disposition.
#[derive(Debug, Clone)]
pub(crate) struct Disposal {
  pub record:   CaseRecord,
  /// Status of the archive row before the disposition, if there was one.
  pub previous: Option<CaseStatus>,
}

// ─── Common table ────────────────────────────────────────────────────────────

/// The common table held in memory, unique on (county, cause, status).
#[derive(Debug, Clone, Default)]
pub(crate) struct CommonBook {
  rows:    Vec<CommonRow>,
  court:   String,
  changed: bool,
}

impl CommonBook {
  pub fn load(rows: Vec<CommonRow>, court: &str) -> Self {
    let before = rows.len();
    let mut seen = HashSet::new();
    let mut kept: Vec<CommonRow> = rows
      .into_iter()
      .rev()
      .filter(|r| {
        let (county, cause) = r.key();
        seen.insert((county, cause.to_string(), r.status))
      })
      .collect();
    kept.reverse();
    Self {
      changed: kept.len() != before,
      rows: kept,
      court: court.to_string(),
    }
  }

  pub fn rows(&self) -> &[CommonRow] { &self.rows }

  fn position(&self, county: County, cause: &str, open: bool) -> Vec<usize> {
    self
      .rows
      .iter()
      .enumerate()
      .filter(|(_, r)| {
        r.key() == (county, cause) && r.status.is_closed() != open
      })
      .map(|(i, _)| i)
      .collect()
  }

  fn set(&mut self, i: usize, row: CommonRow) {
    if self.rows[i] != row {
      self.rows[i] = row;
      self.changed = true;
    }
  }

  /// Insert or refresh the Open row for a case that is still open.
  pub fn upsert_open(&mut self, record: &CaseRecord) {
    let projected = CommonRow::project(record, &self.court);
    match self
      .position(record.county, &record.cause_number, true)
      .first()
    {
      Some(&i) => self.set(i, projected),
      None => {
        self.rows.push(projected);
        self.changed = true;
      }
    }
  }

  /// Bring the common table in line with an archived case so it holds a
  /// single closed row for it.
  ///
  /// With `replace_open`, the case has left the open table: its Open row is
  /// turned into the closed row in place. Without it, an Open row is left
  /// alone for the next pending report to resolve.
  pub fn sync_archived(&mut self, record: &CaseRecord, replace_open: bool) {
    let projected = CommonRow::project(record, &self.court);
    let open = self.position(record.county, &record.cause_number, true);
    let closed = self.position(record.county, &record.cause_number, false);

    let target = if replace_open {
      open.first().or(closed.first()).copied()
    } else {
      closed.first().copied()
    };

    let Some(target) = target else {
      self.rows.push(projected);
      self.changed = true;
      return;
    };

    self.set(target, projected);
    let mut stale: Vec<usize> = closed
      .into_iter()
      .chain(if replace_open { open } else { Vec::new() })
      .filter(|&i| i != target)
      .collect();
    if !stale.is_empty() {
      stale.sort_unstable();
      for i in stale.into_iter().rev() {
        self.rows.remove(i);
      }
      self.changed = true;
    }
  }

  /// Full rewrite of the common table, Open rows first, then Dropped, then
  /// Disposed; order within a status is kept.
  pub fn into_write(mut self) -> Option<TableWrite> {
    if !self.changed {
      return None;
    }
    self
      .rows
      .sort_by(|a, b| b.status.as_ref().cmp(a.status.as_ref()));
    Some(TableWrite::overwrite(
      TableId::CommonTable,
      self.rows.iter().map(CommonRow::to_row).collect(),
    ))
  }
}
