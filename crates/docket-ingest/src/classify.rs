//! Case-type classification from the report's source label, its category,
//! and the cause-number pattern.

use docket_core::{case::CaseType, report::ReportCategory};

/// Classification of a whole report; decides which tables it reconciles
/// into. OLS markers in the source label take priority.
pub fn classify_report(source_label: &str, category: ReportCategory) -> CaseType {
  let label = source_label.to_uppercase();
  let ols = label.contains("OLS");
  if ols && label.contains("CR") {
    CaseType::CriminalOls
  } else if ols && (label.contains("CV") || label.contains("CIVIL")) {
    CaseType::CivilOls
  } else if category.is_criminal() {
    CaseType::Criminal
  } else if category == ReportCategory::Juvenile {
    CaseType::Juvenile
  } else {
    CaseType::Civil
  }
}

/// A row's case type and whether it fell through to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
  pub case_type: CaseType,
  pub defaulted: bool,
}

/// Classify one row of a report whose report-level type is `route`.
///
/// Only plain civil reports are split further by cause number: `TX` marks a
/// tax case, `CV` civil, `JU` juvenile. Anything else is treated as civil
/// and flagged so the caller can surface it.
pub fn classify_row(route: CaseType, cause_number: &str) -> Classification {
  if route != CaseType::Civil {
    return Classification { case_type: route, defaulted: false };
  }
  let cause = cause_number.to_uppercase();
  let (case_type, defaulted) = if cause.contains("TX") {
    (CaseType::Tax, false)
  } else if cause.contains("CV") {
    (CaseType::Civil, false)
  } else if cause.contains("JU") {
    (CaseType::Juvenile, false)
  } else {
    (CaseType::Civil, true)
  };
  Classification { case_type, defaulted }
}
