//! Report search, filters and sort state shared by the table and map views.

use crate::schema::{CrimeReport, CrimeType, ReportStatus};
use chrono::{DateTime, Utc};
use std::{cmp::Ordering, collections::HashMap, str::FromStr};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(Display, AsRefStr, EnumString, EnumIter, Debug, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum TimeRange {
  All,
  Day,
  Week,
  Month,
}

impl TimeRange {
  pub fn label(self) -> &'static str {
    match self {
      TimeRange::All => "All Time",
      TimeRange::Day => "Past 24 Hours",
      TimeRange::Week => "Past Week",
      TimeRange::Month => "Past Month",
    }
  }

  fn max_days(self) -> Option<i64> {
    match self {
      TimeRange::All => None,
      TimeRange::Day => Some(1),
      TimeRange::Week => Some(7),
      TimeRange::Month => Some(30),
    }
  }
}

impl Default for TimeRange {
  fn default() -> Self {
    TimeRange::All
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
  pub search: String,
  pub types: Vec<CrimeType>,
  pub statuses: Vec<ReportStatus>,
  pub time_range: TimeRange,
}

impl ReportFilter {
  pub fn matches(&self, report: &CrimeReport, now: DateTime<Utc>) -> bool {
    let query = self.search.to_lowercase();
    if !query.is_empty()
      && ![
        report.title.as_str(),
        report.description.as_str(),
        report.location.address.as_str(),
        report.crime_type.as_ref(),
        report.status.as_ref(),
      ]
      .iter()
      .any(|field| field.to_lowercase().contains(&query))
    {
      return false;
    }

    if !self.types.is_empty() && !self.types.contains(&report.crime_type) {
      return false;
    }

    if !self.statuses.is_empty() && !self.statuses.contains(&report.status) {
      return false;
    }

    match self.time_range.max_days() {
      Some(max) => (now - report.reported_at).num_days() <= max,
      None => true,
    }
  }

  pub fn apply(&self, reports: Vec<CrimeReport>, now: DateTime<Utc>) -> Vec<CrimeReport> {
    reports.into_iter().filter(|r| self.matches(r, now)).collect()
  }

  pub fn is_narrowed(&self) -> bool {
    !self.types.is_empty() || !self.statuses.is_empty() || self.time_range != TimeRange::All
  }

  /// Reads `q`, `types`, `statuses` and `range`; list values are comma separated.
  pub fn from_query(query: &HashMap<String, String>) -> Self {
    ReportFilter {
      search: query.get("q").cloned().unwrap_or_default(),
      types: parse_list(query.get("types")),
      statuses: parse_list(query.get("statuses")),
      time_range: query
        .get("range")
        .and_then(|r| TimeRange::from_str(r).ok())
        .unwrap_or_default(),
    }
  }

  pub fn to_query(&self) -> Vec<(&'static str, String)> {
    let mut pairs = vec![];
    if !self.search.is_empty() {
      pairs.push(("q", self.search.clone()));
    }
    if !self.types.is_empty() {
      pairs.push(("types", join_list(&self.types)));
    }
    if !self.statuses.is_empty() {
      pairs.push(("statuses", join_list(&self.statuses)));
    }
    if self.time_range != TimeRange::All {
      pairs.push(("range", self.time_range.to_string()));
    }
    pairs
  }

  pub fn toggle_type(&self, crime_type: CrimeType) -> Self {
    let mut next = self.clone();
    toggle(&mut next.types, crime_type);
    next
  }

  pub fn toggle_status(&self, status: ReportStatus) -> Self {
    let mut next = self.clone();
    toggle(&mut next.statuses, status);
    next
  }
}

fn toggle<T: PartialEq>(list: &mut Vec<T>, item: T) {
  match list.iter().position(|x| *x == item) {
    Some(index) => {
      list.remove(index);
    }
    None => list.push(item),
  }
}

fn parse_list<T: FromStr>(value: Option<&String>) -> Vec<T> {
  value
    .map(|v| v.split(',').filter_map(|s| T::from_str(s.trim()).ok()).collect())
    .unwrap_or_default()
}

fn join_list<T: ToString>(items: &[T]) -> String {
  items.iter().map(T::to_string).collect::<Vec<_>>().join(",")
}

#[derive(Display, AsRefStr, EnumString, EnumIter, Debug, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
  ReportedAt,
  Title,
  Type,
  Status,
  Verification,
}

#[derive(Display, AsRefStr, EnumString, Debug, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
  Asc,
  Desc,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sort {
  pub key: SortKey,
  pub direction: Direction,
}

impl Default for Sort {
  fn default() -> Self {
    Sort {
      key: SortKey::ReportedAt,
      direction: Direction::Desc,
    }
  }
}

impl Sort {
  /// Sort state after a click on `key`'s column header.
  pub fn select(self, key: SortKey) -> Sort {
    if self.key == key {
      Sort {
        key,
        direction: match self.direction {
          Direction::Asc => Direction::Desc,
          Direction::Desc => Direction::Asc,
        },
      }
    } else {
      Sort {
        key,
        direction: Direction::Desc,
      }
    }
  }

  fn compare(&self, a: &CrimeReport, b: &CrimeReport) -> Ordering {
    let text = |r: &CrimeReport| -> String {
      match self.key {
        SortKey::Title => r.title.to_lowercase(),
        SortKey::Type => r.crime_type.to_string(),
        SortKey::Status => r.status.to_string(),
        SortKey::Verification => r.verification().to_string(),
        SortKey::ReportedAt => String::new(),
      }
    };
    let ordering = match self.key {
      SortKey::ReportedAt => a.reported_at.cmp(&b.reported_at),
      _ => text(a).cmp(&text(b)),
    };
    match self.direction {
      Direction::Asc => ordering,
      Direction::Desc => ordering.reverse(),
    }
  }

  pub fn apply(&self, reports: &mut [CrimeReport]) {
    reports.sort_by(|a, b| self.compare(a, b));
  }

  pub fn from_query(query: &HashMap<String, String>) -> Self {
    let default = Sort::default();
    Sort {
      key: query
        .get("sort")
        .and_then(|k| SortKey::from_str(k).ok())
        .unwrap_or(default.key),
      direction: query
        .get("dir")
        .and_then(|d| Direction::from_str(d).ok())
        .unwrap_or(default.direction),
    }
  }

  pub fn to_query(&self) -> Vec<(&'static str, String)> {
    vec![("sort", self.key.to_string()), ("dir", self.direction.to_string())]
  }
}
