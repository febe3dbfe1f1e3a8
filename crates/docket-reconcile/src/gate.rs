//! The report freshness gate.
//!
//! Each report is checked on its own first (resolved header, district court,
//! parseable and non-regressing as-of date). The reports that pass are then
//! checked together as a batch, and a batch-level failure halts every report
//! in it before anything is written.

use std::collections::{BTreeSet, HashSet};

use docket_core::{
  date::AsOfDate,
  report::{County, ReportCategory, ReportHeader},
};
use serde::Serialize;
use thiserror::Error;

use crate::tracker::TrackerBook;

/// Why a single report was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
  #[error("county could not be resolved ({county})")]
  UnresolvedCounty { county: County },
  #[error("report type could not be resolved")]
  UnresolvedCategory,
  #[error("report is not from the district court")]
  NotDistrictCourt,
  #[error("as-of date {value:?} could not be read")]
  UnparseableDate { value: String },
  #[error("as-of date {incoming} is older than the recorded {last}")]
  Stale { last: String, incoming: String },
}

/// Why a whole batch was halted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BatchRejection {
  #[error("more than one {category} report for {county} in the batch")]
  DuplicateReport {
    county:   County,
    category: ReportCategory,
  },
  #[error("reports in the batch disagree on as-of date ({first} vs {other})")]
  DateMismatch { first: String, other: String },
  #[error(
    "accepting {incoming} would leave report dates {dates:?} in flight; \
     upload the missing reports first"
  )]
  ExcessiveSkew {
    incoming: String,
    dates:    Vec<String>,
  },
}

/// A report that passed the single-report checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admitted {
  pub county:   County,
  pub category: ReportCategory,
  pub as_of:    AsOfDate,
}

/// Most distinct as-of dates that may be recorded at once across all
/// tracked categories: the current cycle and the one being caught up.
pub const MAX_DISTINCT_DATES: usize = 2;

pub fn admit(
  header: &ReportHeader,
  tracker: &TrackerBook,
) -> Result<Admitted, Rejection> {
  if !header.county.is_resolved() {
    return Err(Rejection::UnresolvedCounty { county: header.county });
  }
  let category = header.category.ok_or(Rejection::UnresolvedCategory)?;
  if !header.district_court {
    return Err(Rejection::NotDistrictCourt);
  }
  let as_of = AsOfDate::parse(&header.as_of_date).map_err(|_| {
    Rejection::UnparseableDate { value: header.as_of_date.clone() }
  })?;

  let last = tracker
    .last(header.county, category)
    .unwrap_or_else(AsOfDate::min);
  if as_of < last {
    return Err(Rejection::Stale {
      last:     last.to_string(),
      incoming: as_of.to_string(),
    });
  }

  Ok(Admitted { county: header.county, category, as_of })
}

/// Batch-level checks over every admitted report.
pub fn check_batch(
  admitted: &[Admitted],
  tracker: &TrackerBook,
) -> Result<(), BatchRejection> {
  let Some(first) = admitted.first() else {
    return Ok(());
  };

  let mut seen = HashSet::new();
  for a in admitted {
    if !seen.insert((a.county, a.category)) {
      return Err(BatchRejection::DuplicateReport {
        county:   a.county,
        category: a.category,
      });
    }
  }

  if let Some(other) = admitted.iter().find(|a| a.as_of != first.as_of) {
    return Err(BatchRejection::DateMismatch {
      first: first.as_of.to_string(),
      other: other.as_of.to_string(),
    });
  }

  let mut dates: BTreeSet<AsOfDate> = tracker.recorded_dates().collect();
  dates.insert(first.as_of);
  if dates.len() > MAX_DISTINCT_DATES {
    return Err(BatchRejection::ExcessiveSkew {
      incoming: first.as_of.to_string(),
      dates:    dates.iter().map(AsOfDate::to_string).collect(),
    });
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::{FixedOffset, TimeZone};
  use docket_core::date::LoadStamp;

  use super::*;

  fn stamp() -> LoadStamp {
    let tz = FixedOffset::west_opt(6 * 3600).unwrap();
    LoadStamp::new(tz.with_ymd_and_hms(2024, 4, 16, 9, 0, 0).unwrap())
  }

  fn date(s: &str) -> AsOfDate { AsOfDate::parse(s).unwrap() }

  fn header(county: County, category: ReportCategory, as_of: &str) -> ReportHeader {
    ReportHeader {
      category:       Some(category),
      county,
      district_court: true,
      as_of_date:     as_of.into(),
      source_label:   String::new(),
    }
  }

  fn admitted(county: County, category: ReportCategory, as_of: &str) -> Admitted {
    Admitted { county, category, as_of: date(as_of) }
  }

  #[test]
  fn unresolved_headers_are_rejected() {
    let book = TrackerBook::default();
    let mut h = header(County::AllCounties, ReportCategory::Civil, "04/15/2024");
    assert!(matches!(
      admit(&h, &book),
      Err(Rejection::UnresolvedCounty { .. })
    ));

    h.county = County::Dimmit;
    h.category = None;
    assert_eq!(admit(&h, &book), Err(Rejection::UnresolvedCategory));

    h.category = Some(ReportCategory::Civil);
    h.district_court = false;
    assert_eq!(admit(&h, &book), Err(Rejection::NotDistrictCourt));

    h.district_court = true;
    h.as_of_date = "sometime".into();
    assert!(matches!(
      admit(&h, &book),
      Err(Rejection::UnparseableDate { .. })
    ));
  }

  #[test]
  fn first_report_for_a_category_is_admitted() {
    let book = TrackerBook::default();
    let h = header(County::Dimmit, ReportCategory::Civil, "04/15/24");
    let a = admit(&h, &book).unwrap();
    assert_eq!(a.as_of, date("04/15/2024"));
  }

  #[test]
  fn older_report_is_stale_but_equal_date_is_admitted() {
    let mut book = TrackerBook::default();
    book.record(
      County::Dimmit,
      ReportCategory::Civil,
      date("04/15/2024"),
      stamp(),
    );
    let older = header(County::Dimmit, ReportCategory::Civil, "04/01/2024");
    assert!(matches!(admit(&older, &book), Err(Rejection::Stale { .. })));

    let same = header(County::Dimmit, ReportCategory::Civil, "04/15/2024");
    assert!(admit(&same, &book).is_ok());

    // A different category for the same county has its own history.
    let other = header(County::Dimmit, ReportCategory::Criminal, "04/01/2024");
    assert!(admit(&other, &book).is_ok());
  }

  #[test]
  fn duplicate_reports_halt_the_batch() {
    let book = TrackerBook::default();
    let batch = [
      admitted(County::Zavala, ReportCategory::Civil, "04/15/2024"),
      admitted(County::Zavala, ReportCategory::Civil, "04/15/2024"),
    ];
    assert!(matches!(
      check_batch(&batch, &book),
      Err(BatchRejection::DuplicateReport { .. })
    ));
  }

  #[test]
  fn mismatched_dates_halt_the_batch() {
    let book = TrackerBook::default();
    let batch = [
      admitted(County::Zavala, ReportCategory::Civil, "04/15/2024"),
      admitted(County::Dimmit, ReportCategory::Civil, "04/22/2024"),
    ];
    assert!(matches!(
      check_batch(&batch, &book),
      Err(BatchRejection::DateMismatch { .. })
    ));
  }

  #[test]
  fn catching_up_laggards_is_allowed_but_skipping_a_cycle_is_not() {
    let mut book = TrackerBook::default();
    book.record(
      County::Dimmit,
      ReportCategory::Civil,
      date("04/08/2024"),
      stamp(),
    );
    book.record(
      County::Zavala,
      ReportCategory::Civil,
      date("04/15/2024"),
      stamp(),
    );

    let catch_up = [admitted(County::Dimmit, ReportCategory::Civil, "04/15/2024")];
    assert!(check_batch(&catch_up, &book).is_ok());

    let skip = [admitted(County::Zavala, ReportCategory::Civil, "04/22/2024")];
    assert!(matches!(
      check_batch(&skip, &book),
      Err(BatchRejection::ExcessiveSkew { .. })
    ));
  }

  #[test]
  fn empty_batch_passes() {
    assert!(check_batch(&[], &TrackerBook::default()).is_ok());
  }
}
