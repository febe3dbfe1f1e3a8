//! The record normalizer: parser rows plus header facts in, typed records
//! shaped for one reconciliation path out.

use docket_core::{
  case::{
    CaseDetail, CaseRecord, CaseStatus, CaseType, CivilDetail, CriminalDetail,
    Disposition, Domain, JuvenileDetail,
  },
  date::{AsOfDate, History, LoadStamp},
  inactive::{InactiveCase, InactiveStatus},
  report::{County, ReportCategory, ReportHeader, ReportShape},
  table::field,
};
use serde::Serialize;
use tracing::warn;

use crate::{
  Error, Result,
  classify::{classify_report, classify_row},
  raw::{RawRecord, history, text},
};

// ─── Output ──────────────────────────────────────────────────────────────────

/// Rows ready for the engine, grouped the way each path consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedReport {
  Pending(Vec<CaseRecord>),
  Disposed(Vec<CaseRecord>),
  /// A juvenile report lists open and disposed cases together.
  Juvenile {
    open:     Vec<CaseRecord>,
    disposed: Vec<CaseRecord>,
  },
  Inactive(Vec<InactiveCase>),
}

impl NormalizedReport {
  pub fn len(&self) -> usize {
    match self {
      Self::Pending(rows) | Self::Disposed(rows) => rows.len(),
      Self::Juvenile { open, disposed } => open.len() + disposed.len(),
      Self::Inactive(rows) => rows.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
  /// Row excluded: blank cause number.
  BlankCauseNumber,
  /// Row excluded: its county could not be resolved.
  UnresolvedCounty { county: String },
  /// Row kept as Civil because nothing in its cause number identified it.
  DefaultedCaseType,
}

/// A per-row problem that did not stop the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
  /// 0-based position in the parser output.
  pub row:          usize,
  pub cause_number: String,
  #[serde(flatten)]
  pub kind:         WarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
  pub county:   County,
  pub category: ReportCategory,
  pub as_of:    AsOfDate,
  /// Report-level case type; selects the open/closed table pair.
  pub route:    CaseType,
  /// Load time stamped on every row of the report.
  pub stamp:    LoadStamp,
  pub report:   NormalizedReport,
  pub warnings: Vec<RowWarning>,
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

/// Normalize one report's parser rows.
///
/// Every row must carry a `Cause Number` key; a row without one means the
/// parser mis-sliced the report and the whole report fails with
/// [`Error::MalformedReport`]. Rows with a blank cause number or an
/// unresolvable county are dropped with a warning instead.
pub fn normalize(
  header: &ReportHeader,
  rows: &[RawRecord],
  stamp: LoadStamp,
) -> Result<Normalized> {
  let category = header.category.ok_or(Error::UnresolvedCategory)?;
  let as_of = AsOfDate::parse(&header.as_of_date)?;
  let route = classify_report(&header.source_label, category);
  let domain = route.domain();

  let mut warnings = Vec::new();
  let mut accepted = Vec::new();

  for (index, raw) in rows.iter().enumerate() {
    if !raw.contains_key(field::CAUSE_NUMBER) {
      return Err(Error::MalformedReport {
        row:    index,
        reason: format!("no {:?} field", field::CAUSE_NUMBER),
      });
    }
    let cause_number = text(raw, field::CAUSE_NUMBER);
    if cause_number.is_empty() {
      warnings.push(RowWarning {
        row: index,
        cause_number,
        kind: WarningKind::BlankCauseNumber,
      });
      continue;
    }

    let county_text = text(raw, field::COUNTY);
    let county = if county_text.is_empty() {
      header.county
    } else {
      County::from_cell(&county_text)
    };
    if !county.is_resolved() {
      warnings.push(RowWarning {
        row: index,
        cause_number,
        kind: WarningKind::UnresolvedCounty {
          county: if county_text.is_empty() {
            header.county.to_string()
          } else {
            county_text
          },
        },
      });
      continue;
    }

    let class = classify_row(route, &cause_number);
    if class.defaulted {
      warnings.push(RowWarning {
        row: index,
        cause_number: cause_number.clone(),
        kind: WarningKind::DefaultedCaseType,
      });
    }

    accepted.push(Accepted {
      raw,
      county,
      cause_number,
      case_type: class.case_type,
    });
  }

  for w in &warnings {
    warn!(
      row = w.row,
      cause_number = %w.cause_number,
      kind = ?w.kind,
      "report row needs attention"
    );
  }

  let ctx = Context { as_of, stamp, domain };
  let report = match category.shape() {
    ReportShape::Pending => NormalizedReport::Pending(
      accepted
        .iter()
        .map(|a| ctx.case(a, CaseStatus::Open))
        .collect(),
    ),
    ReportShape::Disposed => NormalizedReport::Disposed(
      accepted.iter().map(|a| ctx.disposed(a)).collect(),
    ),
    ReportShape::Juvenile => {
      let (open, disposed): (Vec<_>, Vec<_>) = accepted
        .iter()
        .partition(|a| history(a.raw, field::DISPOSED_DATES).is_empty());
      NormalizedReport::Juvenile {
        open:     open
          .into_iter()
          .map(|a| ctx.case(a, CaseStatus::Open))
          .collect(),
        disposed: disposed.into_iter().map(|a| ctx.disposed(a)).collect(),
      }
    }
    ReportShape::Inactive => NormalizedReport::Inactive(
      accepted.iter().map(|a| ctx.inactive(a)).collect(),
    ),
  };

  Ok(Normalized {
    county: header.county,
    category,
    as_of,
    route,
    stamp,
    report,
    warnings,
  })
}

struct Accepted<'a> {
  raw:          &'a RawRecord,
  county:       County,
  cause_number: String,
  case_type:    CaseType,
}

struct Context {
  as_of:  AsOfDate,
  stamp:  LoadStamp,
  domain: Domain,
}

impl Context {
  fn detail(&self, raw: &RawRecord) -> CaseDetail {
    match self.domain {
      Domain::Civil => CaseDetail::Civil(CivilDetail {
        cause_of_action: text(raw, field::CAUSE_OF_ACTION),
        docket_type:     text(raw, field::DOCKET_TYPE),
        ans_file:        text(raw, field::ANS_FILE),
        cr_number:       text(raw, field::CR_NUMBER),
      }),
      Domain::Criminal => CaseDetail::Criminal(CriminalDetail {
        first_offense:        text(raw, field::FIRST_OFFENSE),
        outstanding_warrants: text(raw, field::OUTSTANDING_WARRANTS),
        st_rpt_column:        text(raw, field::ST_RPT_COLUMN),
      }),
      Domain::Juvenile => CaseDetail::Juvenile(JuvenileDetail {
        offense: text(raw, field::OFFENSE),
      }),
    }
  }

  fn case(&self, a: &Accepted<'_>, status: CaseStatus) -> CaseRecord {
    CaseRecord {
      county: a.county,
      cause_number: a.cause_number.clone(),
      file_date: text(a.raw, field::FILE_DATE),
      docket_date: history(a.raw, field::DOCKET_DATE),
      case_type: a.case_type,
      status,
      report_generated_date: text(a.raw, field::REPORT_GENERATED_DATE),
      original_as_of: Some(self.as_of),
      last_as_of: Some(self.as_of),
      load_datetime: Some(self.stamp),
      dropped_at: None,
      disposition: Disposition::default(),
      detail: self.detail(a.raw),
    }
  }

  fn disposed(&self, a: &Accepted<'_>) -> CaseRecord {
    let dates = history(a.raw, field::DISPOSED_DATES);
    let mut record = self.case(a, CaseStatus::Disposed);
    if self.domain == Domain::Juvenile {
      // Juvenile reports list disposition dates only; each date counts as
      // one disposition.
      record.dropped_at = Some(self.as_of.midnight());
      record.disposition = Disposition {
        count: dates.len() as u32,
        dates,
        descriptions: History::new(),
        as_of: Some(self.as_of),
      };
    } else {
      let descriptions = history(a.raw, field::DISPOSITIONS);
      record.disposition = Disposition {
        count: descriptions.len() as u32,
        dates,
        descriptions,
        as_of: Some(self.as_of),
      };
    }
    record
  }

  fn inactive(&self, a: &Accepted<'_>) -> InactiveCase {
    InactiveCase {
      county:           a.county,
      cause_number:     a.cause_number.clone(),
      file_date:        text(a.raw, field::FILE_DATE),
      case_type:        a.case_type,
      status:           InactiveStatus::Inactive,
      inactive_starts:  history(a.raw, field::INACTIVE_START_DATE),
      inactive_ends:    history(a.raw, field::INACTIVE_END_DATE),
      inactive_reasons: history(a.raw, field::INACTIVE_REASON),
      estimated_end:    History::new(),
      original_as_of:   History::single(self.as_of.to_string()),
      last_as_of:       History::single(self.as_of.to_string()),
      load_datetime:    Some(self.stamp),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{FixedOffset, TimeZone};

  use super::*;
  use crate::raw::RawValue;

  fn stamp() -> LoadStamp {
    let tz = FixedOffset::west_opt(6 * 3600).unwrap();
    LoadStamp::new(tz.with_ymd_and_hms(2024, 4, 16, 9, 0, 0).unwrap())
  }

  fn header(category: ReportCategory, label: &str) -> ReportHeader {
    ReportHeader {
      category:       Some(category),
      county:         County::Dimmit,
      district_court: true,
      as_of_date:     "04/15/2024".into(),
      source_label:   label.into(),
    }
  }

  fn row(pairs: &[(&str, RawValue)]) -> RawRecord {
    pairs
      .iter()
      .map(|(k, v)| ((*k).to_string(), v.clone()))
      .collect()
  }

  #[test]
  fn pending_civil_rows_are_stamped_open() {
    let rows = vec![row(&[
      ("Cause Number", " 24-01-00001-CV ".into()),
      ("File Date", "01/02/2024".into()),
      ("Docket Date", "05/01/2024".into()),
      ("Cause of Action", "DEBT".into()),
    ])];
    let n =
      normalize(&header(ReportCategory::Civil, "dimmit.pdf"), &rows, stamp())
        .unwrap();
    let NormalizedReport::Pending(cases) = n.report else {
      panic!("expected pending");
    };
    let case = &cases[0];
    assert_eq!(case.cause_number, "24-01-00001-CV");
    assert_eq!(case.status, CaseStatus::Open);
    assert_eq!(case.county, County::Dimmit);
    assert_eq!(case.original_as_of, Some(n.as_of));
    assert_eq!(case.last_as_of, Some(n.as_of));
    assert_eq!(case.load_datetime, Some(stamp()));
    assert_eq!(case.fields().cause(), "DEBT");
    assert!(n.warnings.is_empty());
  }

  #[test]
  fn missing_cause_number_key_is_malformed() {
    let rows = vec![
      row(&[("Cause Number", "24-01-00001-CV".into())]),
      row(&[("File Date", "01/02/2024".into())]),
    ];
    let err =
      normalize(&header(ReportCategory::Civil, "x.pdf"), &rows, stamp())
        .unwrap_err();
    assert!(matches!(err, Error::MalformedReport { row: 1, .. }));
  }

  #[test]
  fn blank_cause_and_bad_county_are_excluded_with_warnings() {
    let rows = vec![
      row(&[("Cause Number", "".into())]),
      row(&[
        ("Cause Number", "24-01-00002-CV".into()),
        ("County", "Webb".into()),
      ]),
      row(&[("Cause Number", "24-01-00003-CV".into())]),
    ];
    let n = normalize(&header(ReportCategory::Civil, "x.pdf"), &rows, stamp())
      .unwrap();
    assert_eq!(n.report.len(), 1);
    assert_eq!(n.warnings.len(), 2);
    assert_eq!(n.warnings[0].kind, WarningKind::BlankCauseNumber);
    assert_eq!(n.warnings[1].kind, WarningKind::UnresolvedCounty {
      county: "Webb".into(),
    });
  }

  #[test]
  fn unclassifiable_cause_is_kept_as_civil_with_warning() {
    let rows = vec![row(&[("Cause Number", "2023-0045".into())])];
    let n = normalize(&header(ReportCategory::Civil, "x.pdf"), &rows, stamp())
      .unwrap();
    assert_eq!(n.report.len(), 1);
    assert_eq!(n.warnings[0].kind, WarningKind::DefaultedCaseType);
  }

  #[test]
  fn criminal_disposed_counts_dispositions_before_flattening() {
    let rows = vec![row(&[
      ("Cause Number", "23-09-00044-CR".into()),
      ("Disposed Dates", vec!["04/01/2024", "04/02/2024"].into()),
      ("Dispositions", vec!["DISMISSED", "PROBATION", "FINE"].into()),
      ("First Offense", vec!["DWI", "EVADING"].into()),
    ])];
    let n = normalize(
      &header(ReportCategory::CriminalDisposed, "crim_disp.pdf"),
      &rows,
      stamp(),
    )
    .unwrap();
    assert_eq!(n.route, CaseType::Criminal);
    let NormalizedReport::Disposed(cases) = n.report else {
      panic!("expected disposed");
    };
    let d = &cases[0].disposition;
    assert_eq!(d.count, 3);
    assert_eq!(d.descriptions.to_cell(), "DISMISSED\nPROBATION\nFINE");
    assert_eq!(d.as_of, Some(n.as_of));
    assert_eq!(cases[0].status, CaseStatus::Disposed);
    assert_eq!(cases[0].fields().cause(), "DWI\nEVADING");
  }

  #[test]
  fn juvenile_report_splits_on_disposed_dates() {
    let rows = vec![
      row(&[
        ("Cause Number", "24-JU-0001".into()),
        ("Offense", vec!["THEFT"].into()),
        ("Disposed Dates", RawValue::List(vec![])),
      ]),
      row(&[
        ("Cause Number", "24-JU-0002".into()),
        ("Disposed Dates", vec!["04/10/2024", "04/12/2024"].into()),
      ]),
    ];
    let n =
      normalize(&header(ReportCategory::Juvenile, "juv.pdf"), &rows, stamp())
        .unwrap();
    let NormalizedReport::Juvenile { open, disposed } = n.report else {
      panic!("expected juvenile");
    };
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].case_type, CaseType::Juvenile);
    assert_eq!(disposed.len(), 1);
    assert_eq!(disposed[0].disposition.count, 2);
    assert!(disposed[0].disposition.descriptions.is_empty());
    assert_eq!(disposed[0].dropped_at, Some(n.as_of.midnight()));
  }

  #[test]
  fn inactive_rows_start_inactive_with_single_period() {
    let rows = vec![row(&[
      ("Cause Number", "22-11-00400-CV".into()),
      ("Inactive Start Date", vec!["01/05/2024"].into()),
      ("Inactive Reason", vec!["BANKRUPTCY"].into()),
    ])];
    let n = normalize(
      &header(ReportCategory::CivilInactive, "inactive.pdf"),
      &rows,
      stamp(),
    )
    .unwrap();
    let NormalizedReport::Inactive(cases) = n.report else {
      panic!("expected inactive");
    };
    assert_eq!(cases[0].status, InactiveStatus::Inactive);
    assert_eq!(cases[0].original_as_of.to_cell(), "04/15/2024");
    assert!(cases[0].estimated_end.is_empty());
  }

  #[test]
  fn unresolved_category_fails() {
    let mut h = header(ReportCategory::Civil, "x.pdf");
    h.category = None;
    assert!(matches!(
      normalize(&h, &[], stamp()),
      Err(Error::UnresolvedCategory)
    ));
  }
}
