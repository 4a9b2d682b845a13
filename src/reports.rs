use crate::{
  schema::{CrimeReport, CrimeType, Location, ReportDraft, ReportStatus, VerificationStatus},
  util,
};
use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared report collection, newest submission first.
pub struct ReportStore {
  reports: RwLock<Vec<CrimeReport>>,
}

#[derive(Debug, Default, PartialEq)]
pub struct ReportStats {
  pub total: usize,
  pub pending: usize,
  pub resolved: usize,
  pub verified: usize,
}

impl ReportStore {
  pub fn new(reports: Vec<CrimeReport>) -> Self {
    ReportStore {
      reports: RwLock::new(reports),
    }
  }

  pub fn seeded() -> Self {
    Self::new(seed_reports())
  }

  fn read(&self) -> RwLockReadGuard<'_, Vec<CrimeReport>> {
    self.reports.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, Vec<CrimeReport>> {
    self.reports.write().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn reports(&self) -> Vec<CrimeReport> {
    self.read().clone()
  }

  pub fn reported_by(&self, user_id: &str) -> Vec<CrimeReport> {
    self.read().iter().filter(|r| r.reported_by == user_id).cloned().collect()
  }

  pub fn get_report_by_id(&self, id: &str) -> Option<CrimeReport> {
    self.read().iter().find(|r| r.id == id).cloned()
  }

  pub fn add_report(&self, draft: ReportDraft) -> CrimeReport {
    let mut reports = self.write();

    let mut id = util::gen_id();
    while reports.iter().any(|r| r.id == id) {
      id = util::gen_id();
    }

    let report = CrimeReport {
      id,
      title: draft.title,
      description: draft.description,
      location: draft.location,
      crime_type: draft.crime_type,
      status: ReportStatus::Pending,
      images: draft.images,
      reported_by: draft.reported_by,
      reported_at: Utc::now(),
      verification_status: draft.verification_status,
      verification_reason: draft.verification_reason,
    };
    log::info!("report {} ({}) filed by {}", report.id, report.crime_type, report.reported_by);
    reports.insert(0, report.clone());
    report
  }

  /// Returns whether a report matched; unknown ids are ignored.
  pub fn update_report_status(&self, id: &str, status: ReportStatus) -> bool {
    match self.write().iter_mut().find(|r| r.id == id) {
      Some(report) => {
        log::debug!("report {} status {} -> {}", id, report.status, status);
        report.status = status;
        true
      }
      None => false,
    }
  }

  /// The reason is only replaced when a non-empty one is given.
  pub fn update_verification_status(&self, id: &str, status: VerificationStatus, reason: Option<String>) -> bool {
    match self.write().iter_mut().find(|r| r.id == id) {
      Some(report) => {
        log::debug!("report {} verification -> {}", id, status);
        report.verification_status = Some(status);
        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
          report.verification_reason = Some(reason);
        }
        true
      }
      None => false,
    }
  }

  pub fn stats(&self) -> ReportStats {
    self.read().iter().fold(ReportStats::default(), |mut stats, r| {
      stats.total += 1;
      match r.status {
        ReportStatus::Pending => stats.pending += 1,
        ReportStatus::Resolved => stats.resolved += 1,
        ReportStatus::Investigating | ReportStatus::Dismissed => {}
      }
      if r.verification_status == Some(VerificationStatus::Verified) {
        stats.verified += 1;
      }
      stats
    })
  }
}

fn timestamp(rfc3339: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(rfc3339)
    .map(|t| t.with_timezone(&Utc))
    .unwrap_or_else(|_| Utc::now())
}

#[allow(clippy::too_many_arguments)]
fn seed(
  id: &str,
  title: &str,
  description: &str,
  location: (&str, f64, f64),
  crime_type: CrimeType,
  status: ReportStatus,
  image: &str,
  reported_at: &str,
  verification: (VerificationStatus, Option<&str>),
) -> CrimeReport {
  CrimeReport {
    id: id.into(),
    title: title.into(),
    description: description.into(),
    location: Location {
      address: location.0.into(),
      latitude: location.1,
      longitude: location.2,
    },
    crime_type,
    status,
    images: vec![image.into()],
    reported_by: "1".into(),
    reported_at: timestamp(reported_at),
    verification_status: Some(verification.0),
    verification_reason: verification.1.map(String::from),
  }
}

pub fn seed_reports() -> Vec<CrimeReport> {
  vec![
    seed(
      "1",
      "Smartphone theft at Central Park",
      "My phone was stolen while I was jogging in Central Park around 8 AM.",
      ("Central Park, New York, NY", 40.785091, -73.968285),
      CrimeType::Theft,
      ReportStatus::Investigating,
      "https://images.pexels.com/photos/1493102/pexels-photo-1493102.jpeg",
      "2025-01-15T08:30:00Z",
      (VerificationStatus::Verified, Some("Multiple similar reports in the area")),
    ),
    seed(
      "2",
      "Vandalism at Main Street",
      "A group of teenagers were seen vandalizing the storefront at 123 Main St.",
      ("123 Main St, Boston, MA", 42.361145, -71.057083),
      CrimeType::Vandalism,
      ReportStatus::Pending,
      "https://images.pexels.com/photos/9533519/pexels-photo-9533519.jpeg",
      "2025-01-16T15:45:00Z",
      (VerificationStatus::Pending, None),
    ),
    seed(
      "3",
      "Car break-in on Washington Ave",
      "My car window was smashed and some items were stolen from inside.",
      ("456 Washington Ave, Seattle, WA", 47.608013, -122.335167),
      CrimeType::Burglary,
      ReportStatus::Investigating,
      "https://images.pexels.com/photos/5598283/pexels-photo-5598283.jpeg",
      "2025-01-14T22:10:00Z",
      (VerificationStatus::Verified, Some("Security camera footage confirms the incident")),
    ),
    seed(
      "4",
      "Online fraud attempt",
      "I received an email claiming to be from my bank but it was a phishing attempt.",
      ("Online", 37.7749, -122.4194),
      CrimeType::Fraud,
      ReportStatus::Pending,
      "https://images.pexels.com/photos/4482900/pexels-photo-4482900.jpeg",
      "2025-01-17T09:20:00Z",
      (VerificationStatus::Pending, None),
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft(title: &str) -> ReportDraft {
    ReportDraft {
      title: title.into(),
      description: "Bike taken from the rack outside the library.".into(),
      location: Location {
        address: "1 Library Way".into(),
        latitude: 40.7128,
        longitude: -74.0060,
      },
      crime_type: CrimeType::Theft,
      images: vec![],
      reported_by: "42".into(),
      verification_status: None,
      verification_reason: None,
    }
  }

  #[test]
  fn seed_has_four_reports() {
    let store = ReportStore::seeded();
    let reports = store.reports();
    assert_eq!(reports.len(), 4);
    assert_eq!(reports[3].title, "Online fraud attempt");
    assert_eq!(
      store.stats(),
      ReportStats {
        total: 4,
        pending: 2,
        resolved: 0,
        verified: 2,
      }
    );
  }

  #[test]
  fn added_report_is_pending_unique_and_first() {
    let store = ReportStore::seeded();
    let before = store.reports();

    let report = store.add_report(draft("Stolen bike"));

    assert_eq!(report.status, ReportStatus::Pending);
    assert!(before.iter().all(|r| r.id != report.id));
    let after = store.reports();
    assert_eq!(after.len(), 5);
    assert_eq!(after[0], report);
    assert_eq!(store.get_report_by_id(&report.id), Some(report));
  }

  #[test]
  fn insertion_order_wins_over_timestamps() {
    let store = ReportStore::new(vec![]);
    let first = store.add_report(draft("first"));
    let second = store.add_report(draft("second"));

    let ids: Vec<_> = store.reports().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
  }

  #[test]
  fn status_update_on_unknown_id_changes_nothing() {
    let store = ReportStore::seeded();
    let before = store.reports();

    assert!(!store.update_report_status("missing", ReportStatus::Resolved));

    assert_eq!(store.reports(), before);
  }

  #[test]
  fn status_update_touches_only_status() {
    let store = ReportStore::seeded();
    let mut expected = store.get_report_by_id("2").unwrap();

    assert!(store.update_report_status("2", ReportStatus::Dismissed));

    expected.status = ReportStatus::Dismissed;
    assert_eq!(store.get_report_by_id("2").unwrap(), expected);
  }

  #[test]
  fn verification_keeps_reason_unless_replaced() {
    let store = ReportStore::seeded();

    store.update_verification_status("1", VerificationStatus::Fake, None);
    let report = store.get_report_by_id("1").unwrap();
    assert_eq!(report.verification_status, Some(VerificationStatus::Fake));
    assert_eq!(report.verification_reason.as_deref(), Some("Multiple similar reports in the area"));

    store.update_verification_status("1", VerificationStatus::Verified, Some("".into()));
    let report = store.get_report_by_id("1").unwrap();
    assert_eq!(report.verification_reason.as_deref(), Some("Multiple similar reports in the area"));

    store.update_verification_status("1", VerificationStatus::Verified, Some("Officer confirmed".into()));
    let report = store.get_report_by_id("1").unwrap();
    assert_eq!(report.verification_reason.as_deref(), Some("Officer confirmed"));
  }

  #[test]
  fn verification_update_on_unknown_id_changes_nothing() {
    let store = ReportStore::seeded();
    let before = store.reports();

    assert!(!store.update_verification_status("nope", VerificationStatus::Verified, Some("x".into())));

    assert_eq!(store.reports(), before);
  }

  #[test]
  fn reported_by_filters_owner() {
    let store = ReportStore::seeded();
    let mine = store.add_report(draft("mine"));

    assert_eq!(store.reported_by("42"), vec![mine]);
    assert_eq!(store.reported_by("1").len(), 4);
    assert!(store.reported_by("3").is_empty());
  }
}
