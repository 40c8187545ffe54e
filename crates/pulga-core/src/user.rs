//! Canonical user and vendor-accreditation records.
//!
//! These are value objects built fresh from every API response. Field names
//! serialize in camelCase so a persisted session keeps the shape the web
//! client has always stored.

use serde::{Deserialize, Serialize};

use crate::{role, rut};

// ─── NormalizedUser ──────────────────────────────────────────────────────────

/// A user record with fixed field names, whatever the API called them.
///
/// Required text fields are `""` when the source had nothing usable; `roles`
/// holds canonical, de-duplicated role values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizedUser {
  pub id:          String,
  pub name:        String,
  pub last_name:   String,
  pub email:       String,
  /// Canonical RUT (`12345678-9`), or `""`.
  pub rut:         String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub photo:       Option<String>,
  pub roles:       Vec<String>,
  pub permissions: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub active:      Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at:  Option<String>,
}

impl NormalizedUser {
  /// `"name lastName"`, trimmed; either part may be missing.
  pub fn display_name(&self) -> String {
    format!("{} {}", self.name, self.last_name).trim().to_string()
  }

  pub fn formatted_rut(&self) -> String { rut::format_rut(&self.rut) }

  pub fn has_role(&self, role: &str) -> bool {
    role::has_role(&self.roles, role)
  }

  pub fn is_admin(&self) -> bool { role::is_admin(&self.roles) }
}

// ─── Vendor accreditation ────────────────────────────────────────────────────

/// Review state of a vendor accreditation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccreditationStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
  /// A status this client does not know; kept verbatim.
  Other(String),
}

impl AccreditationStatus {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
      Self::Other(s) => s.as_str(),
    }
  }
}

impl From<String> for AccreditationStatus {
  fn from(s: String) -> Self {
    match s.trim().to_lowercase().as_str() {
      "" | "pending" => Self::Pending,
      "approved" => Self::Approved,
      "rejected" => Self::Rejected,
      _ => Self::Other(s),
    }
  }
}

impl From<AccreditationStatus> for String {
  fn from(status: AccreditationStatus) -> Self { status.as_str().to_string() }
}

/// Contact details of the user behind an accreditation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Applicant {
  pub name:      String,
  pub last_name: String,
  pub email:     String,
}

/// A request from a user to be accredited as a vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorAccreditationRequest {
  pub id:             String,
  pub user_id:        String,
  pub store_name:     String,
  pub contact_number: String,
  /// Company RUT exactly as submitted (sanitised, not re-normalised).
  pub company_rut:    String,
  pub status:         AccreditationStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub applicant:      Option<Applicant>,
}
