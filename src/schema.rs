use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(Display, AsRefStr, EnumString, EnumIter, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Admin,
  Police,
}

impl Role {
  /// Admin and police accounts get the review tooling.
  pub fn is_staff(self) -> bool {
    match self {
      Role::Admin | Role::Police => true,
      Role::User => false,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Role::User => "User",
      Role::Admin => "Admin",
      Role::Police => "Police",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: String,
  pub name: String,
  pub email: String,
  pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub address: String,
  pub latitude: f64,
  pub longitude: f64,
}

#[derive(Display, AsRefStr, EnumString, EnumIter, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CrimeType {
  Theft,
  Assault,
  Burglary,
  Vandalism,
  Fraud,
  Harassment,
  Other,
}

impl CrimeType {
  pub fn label(self) -> &'static str {
    match self {
      CrimeType::Theft => "Theft",
      CrimeType::Assault => "Assault",
      CrimeType::Burglary => "Burglary",
      CrimeType::Vandalism => "Vandalism",
      CrimeType::Fraud => "Fraud",
      CrimeType::Harassment => "Harassment",
      CrimeType::Other => "Other",
    }
  }
}

#[derive(Display, AsRefStr, EnumString, EnumIter, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
  Pending,
  Investigating,
  Resolved,
  Dismissed,
}

#[derive(Display, AsRefStr, EnumString, EnumIter, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
  Pending,
  Verified,
  Fake,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeReport {
  pub id: String,
  pub title: String,
  pub description: String,
  pub location: Location,
  #[serde(rename = "type")]
  pub crime_type: CrimeType,
  pub status: ReportStatus,
  pub images: Vec<String>,
  pub reported_by: String,
  pub reported_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verification_status: Option<VerificationStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verification_reason: Option<String>,
}

impl CrimeReport {
  /// Absent verification reads as pending.
  pub fn verification(&self) -> VerificationStatus {
    self.verification_status.unwrap_or(VerificationStatus::Pending)
  }
}

/// A report as submitted, before the store assigns id, timestamp and status.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
  pub title: String,
  pub description: String,
  pub location: Location,
  pub crime_type: CrimeType,
  pub images: Vec<String>,
  pub reported_by: String,
  pub verification_status: Option<VerificationStatus>,
  pub verification_reason: Option<String>,
}

#[derive(Display, AsRefStr, EnumString, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sender {
  User,
  Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub id: String,
  pub content: String,
  pub sender: Sender,
  pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  #[test]
  fn user_record_round_trips_through_json() {
    let user = User {
      id: "k3j9x0a1b".into(),
      name: "Jane Roe".into(),
      email: "jane@example.com".into(),
      role: Role::Police,
    };
    let json = serde_json::to_string(&user).unwrap();
    assert_eq!(
      json,
      r#"{"id":"k3j9x0a1b","name":"Jane Roe","email":"jane@example.com","role":"police"}"#
    );
    assert_eq!(serde_json::from_str::<User>(&json).unwrap(), user);
  }

  #[test]
  fn enums_use_lowercase_names() {
    assert_eq!(ReportStatus::Investigating.to_string(), "investigating");
    assert_eq!(CrimeType::from_str("harassment").unwrap(), CrimeType::Harassment);
    assert!(Role::from_str("superuser").is_err());
    assert_eq!(CrimeType::iter().count(), 7);
  }

  #[test]
  fn staff_roles() {
    assert!(!Role::User.is_staff());
    assert!(Role::Admin.is_staff());
    assert!(Role::Police.is_staff());
  }

  #[test]
  fn report_serializes_with_camel_case_fields() {
    let report = CrimeReport {
      id: "1".into(),
      title: "t".into(),
      description: "d".into(),
      location: Location {
        address: "Online".into(),
        latitude: 0.0,
        longitude: 0.0,
      },
      crime_type: CrimeType::Fraud,
      status: ReportStatus::Pending,
      images: vec![],
      reported_by: "1".into(),
      reported_at: Utc::now(),
      verification_status: None,
      verification_reason: None,
    };
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["type"], "fraud");
    assert_eq!(value["reportedBy"], "1");
    assert!(value.get("verificationStatus").is_none());
    assert_eq!(report.verification(), VerificationStatus::Pending);
  }
}
