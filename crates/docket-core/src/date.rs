//! Date and timestamp types used throughout the reconciliation tables.
//!
//! Reports print their as-of date as `MM/DD/YYYY` (occasionally `MM/DD/YY`).
//! Tables store it back in the four-digit form. Load timestamps carry a fixed
//! UTC offset so every record stamped in one run agrees on the clock.

use std::{fmt, str::FromStr};

use chrono::{
  DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound,
  TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

// ─── AsOfDate ────────────────────────────────────────────────────────────────

const AS_OF_FORMAT: &str = "%m/%d/%Y";

/// The date through which a report's contents are accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsOfDate(NaiveDate);

impl AsOfDate {
  pub fn new(date: NaiveDate) -> Self { Self(date) }

  /// The smallest representable as-of date; stands in for "never recorded".
  pub fn min() -> Self { Self(NaiveDate::MIN) }

  pub fn date(&self) -> NaiveDate { self.0 }

  /// Midnight on this date; the timestamp recorded when a case is dropped.
  pub fn midnight(&self) -> NaiveDateTime { self.0.and_time(NaiveTime::MIN) }

  /// Parse `MM/DD/YYYY`, `MM/DD/YY`, or ISO `YYYY-MM-DD`.
  ///
  /// Two-digit years map 00-68 to the 2000s, 69-99 to the 1900s.
  pub fn parse(input: &str) -> Result<Self> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split('/').collect();
    let parsed = match parts.as_slice() {
      [_, _, year] if year.len() == 4 => {
        NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").ok()
      }
      [_, _, year] if year.len() == 2 => {
        NaiveDate::parse_from_str(trimmed, "%m/%d/%y").ok()
      }
      [_] => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok(),
      _ => None,
    };
    parsed
      .map(Self)
      .ok_or_else(|| Error::InvalidAsOfDate(input.to_string()))
  }

  /// Parse an optional table cell; blank cells are `None`.
  pub fn parse_cell(input: &str) -> Result<Option<Self>> {
    if input.trim().is_empty() {
      return Ok(None);
    }
    Self::parse(input).map(Some)
  }
}

impl fmt::Display for AsOfDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format(AS_OF_FORMAT))
  }
}

impl FromStr for AsOfDate {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl Serialize for AsOfDate {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for AsOfDate {
  fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(d)?;
    Self::parse(&raw).map_err(serde::de::Error::custom)
  }
}

/// Render an optional as-of date as a table cell.
pub fn as_of_cell(date: Option<AsOfDate>) -> String {
  date.map(|d| d.to_string()).unwrap_or_default()
}

// ─── Dropped timestamps ──────────────────────────────────────────────────────

const DROPPED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn dropped_cell(at: Option<NaiveDateTime>) -> String {
  at.map(|t| t.format(DROPPED_FORMAT).to_string())
    .unwrap_or_default()
}

pub fn parse_dropped_cell(input: &str) -> Result<Option<NaiveDateTime>> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  NaiveDateTime::parse_from_str(trimmed, DROPPED_FORMAT)
    .map(Some)
    .map_err(|_| Error::field("Dropped DateTime", input))
}

// ─── LoadStamp ───────────────────────────────────────────────────────────────

const LOAD_FORMAT_OUT: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";
const LOAD_FORMAT_IN: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// The wall-clock instant of an upload, in the run's reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadStamp(DateTime<FixedOffset>);

impl LoadStamp {
  pub fn new(at: DateTime<FixedOffset>) -> Self { Self(at) }

  /// The current instant expressed in `zone`, at microsecond precision.
  ///
  /// The offset in effect right now is recorded, so stamps taken in a zone
  /// with daylight saving follow the wall clock.
  pub fn now<Z: TimeZone>(zone: &Z) -> Self {
    Self(
      Utc::now()
        .trunc_subsecs(6)
        .with_timezone(zone)
        .fixed_offset(),
    )
  }

  pub fn at(&self) -> DateTime<FixedOffset> { self.0 }

  pub fn parse(input: &str) -> Result<Self> {
    DateTime::parse_from_str(input.trim(), LOAD_FORMAT_IN)
      .or_else(|_| DateTime::parse_from_rfc3339(input.trim()))
      .map(Self)
      .map_err(|_| Error::InvalidLoadStamp(input.to_string()))
  }

  pub fn parse_cell(input: &str) -> Result<Option<Self>> {
    if input.trim().is_empty() {
      return Ok(None);
    }
    Self::parse(input).map(Some)
  }
}

impl fmt::Display for LoadStamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format(LOAD_FORMAT_OUT))
  }
}

impl Serialize for LoadStamp {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for LoadStamp {
  fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(d)?;
    Self::parse(&raw).map_err(serde::de::Error::custom)
  }
}

pub fn load_cell(stamp: Option<LoadStamp>) -> String {
  stamp.map(|s| s.to_string()).unwrap_or_default()
}

// ─── History ─────────────────────────────────────────────────────────────────

/// A newline-joined list of values stored in a single cell, most recent
/// first. Used for docket dates, disposition lists and the inactive-report
/// date histories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History(Vec<String>);

impl History {
  pub fn new() -> Self { Self::default() }

  pub fn single(value: impl Into<String>) -> Self {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
      Self::default()
    } else {
      Self(vec![trimmed.to_string()])
    }
  }

  /// Build from entries in encounter order; blank entries are dropped.
  pub fn from_entries<I, S>(entries: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self(
      entries
        .into_iter()
        .map(|e| e.as_ref().trim().to_string())
        .filter(|e| !e.is_empty())
        .collect(),
    )
  }

  pub fn from_cell(cell: &str) -> Self { Self::from_entries(cell.split('\n')) }

  pub fn to_cell(&self) -> String { self.0.join("\n") }

  pub fn entries(&self) -> &[String] { &self.0 }

  pub fn latest(&self) -> Option<&str> { self.0.first().map(String::as_str) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Put `value` in front, unconditionally.
  pub fn prepend(&mut self, value: impl Into<String>) {
    let value = value.into();
    let trimmed = value.trim();
    if !trimmed.is_empty() {
      self.0.insert(0, trimmed.to_string());
    }
  }

  /// Put every entry of `newer` in front of this history.
  pub fn prepend_all(&mut self, newer: &History) {
    let mut merged = newer.0.clone();
    merged.append(&mut self.0);
    self.0 = merged;
  }

  /// Overwrite the most recent entry, or push one if the history is empty.
  pub fn replace_latest(&mut self, value: impl Into<String>) {
    let value = value.into();
    match self.0.first_mut() {
      Some(first) => *first = value,
      None => self.0.push(value),
    }
  }

  /// Merge an incoming report value into a stored history.
  ///
  /// The incoming value is prepended only if it is non-empty and does not
  /// already occur anywhere in the stored cell text.
  pub fn merged_with(&self, incoming: &History) -> History {
    let incoming_text = incoming.to_cell();
    let stored_text = self.to_cell();
    if incoming_text.is_empty() || stored_text.contains(&incoming_text) {
      return self.clone();
    }
    let mut merged = self.clone();
    merged.prepend_all(incoming);
    merged
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_four_and_two_digit_years() {
    let long = AsOfDate::parse("04/15/2024").unwrap();
    let short = AsOfDate::parse("04/15/24").unwrap();
    assert_eq!(long, short);
    assert!(AsOfDate::parse("12/31/23").unwrap() < long);
    assert_eq!(long.to_string(), "04/15/2024");
  }

  #[test]
  fn parses_iso_dates() {
    let iso = AsOfDate::parse("2024-04-15").unwrap();
    assert_eq!(iso.to_string(), "04/15/2024");
  }

  #[test]
  fn rejects_garbage_dates() {
    assert!(AsOfDate::parse("RAN ON 04/15").is_err());
    assert!(AsOfDate::parse("13/45/2024").is_err());
    assert!(AsOfDate::parse("").is_err());
    assert_eq!(AsOfDate::parse_cell("  ").unwrap(), None);
  }

  #[test]
  fn midnight_renders_as_dropped_cell() {
    let d = AsOfDate::parse("03/01/2024").unwrap();
    assert_eq!(dropped_cell(Some(d.midnight())), "2024-03-01 00:00:00");
    assert_eq!(
      parse_dropped_cell("2024-03-01 00:00:00").unwrap(),
      Some(d.midnight())
    );
  }

  #[test]
  fn load_stamp_round_trips_through_cell() {
    let offset = FixedOffset::west_opt(6 * 3600).unwrap();
    let stamp = LoadStamp::now(&offset);
    let parsed = LoadStamp::parse(&stamp.to_string()).unwrap();
    assert_eq!(parsed, stamp);
    assert!(stamp.to_string().ends_with("-06:00"));
  }

  #[test]
  fn load_stamp_serializes_as_its_cell_text() {
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    let stamp =
      LoadStamp::new(tz.with_ymd_and_hms(2024, 7, 1, 8, 15, 0).unwrap());
    let json = serde_json::to_string(&Some(stamp)).unwrap();
    assert_eq!(json, "\"2024-07-01 08:15:00.000000-05:00\"");
    let back: Option<LoadStamp> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Some(stamp));
    assert!(serde_json::from_str::<LoadStamp>("\"yesterday\"").is_err());
  }

  #[test]
  fn docket_history_prepends_new_dates_once() {
    let stored = History::single("03/01/2024");
    let merged = stored.merged_with(&History::single("04/15/2024"));
    assert_eq!(merged.to_cell(), "04/15/2024\n03/01/2024");

    let again = merged.merged_with(&History::single("04/15/2024"));
    assert_eq!(again, merged);
  }

  #[test]
  fn blank_incoming_docket_keeps_stored_history() {
    let stored = History::single("03/01/2024");
    assert_eq!(stored.merged_with(&History::new()), stored);
  }

  #[test]
  fn empty_stored_history_takes_incoming_without_trailing_newline() {
    let merged = History::new().merged_with(&History::single("04/15/2024"));
    assert_eq!(merged.to_cell(), "04/15/2024");
  }

  #[test]
  fn replace_latest_keeps_older_entries() {
    let mut h = History::from_cell("02/01/2024\n01/01/2024");
    h.replace_latest("03/01/2024");
    assert_eq!(h.to_cell(), "03/01/2024\n01/01/2024");
  }
}
