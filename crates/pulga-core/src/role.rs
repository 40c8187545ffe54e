//! Roles: canonical values, display labels and the admin role catalog.
//!
//! A canonical role value is lowercase, trimmed and free of legacy synonyms.
//! It is the only spelling used for authorization checks and set membership.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::user::NormalizedUser;

/// Legacy role spellings and the canonical value each maps to, in lookup
/// order. Add a row here when the API introduces another alias.
pub const ROLE_SYNONYMS: &[(&str, &str)] =
  &[("usuario", "cliente"), ("user", "cliente")];

// ─── Canonical values ────────────────────────────────────────────────────────

/// Trim, lowercase and resolve legacy synonyms.
///
/// `"  Usuario "` → `"cliente"`, `"ADMIN"` → `"admin"`, `"   "` → `""`.
pub fn canonical_role(role: &str) -> String {
  let trimmed = role.trim().to_lowercase();
  ROLE_SYNONYMS
    .iter()
    .find(|(legacy, _)| *legacy == trimmed)
    .map(|(_, canonical)| (*canonical).to_string())
    .unwrap_or(trimmed)
}

/// Whether `role` is one of the legacy spellings in [`ROLE_SYNONYMS`].
pub fn is_legacy_synonym(role: &str) -> bool {
  let role = role.trim().to_lowercase();
  ROLE_SYNONYMS.iter().any(|(legacy, _)| *legacy == role)
}

/// Whether `roles` grants `role`, comparing canonical values.
pub fn has_role(roles: &[String], role: &str) -> bool {
  let wanted = canonical_role(role);
  !wanted.is_empty() && roles.iter().any(|r| canonical_role(r) == wanted)
}

pub fn is_admin(roles: &[String]) -> bool {
  has_role(roles, KnownRole::Admin.as_ref())
}

// ─── Known roles ─────────────────────────────────────────────────────────────

/// The roles the marketplace ships with. Declaration order is the order they
/// are offered in role pickers.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  Display,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KnownRole {
  Admin,
  Vendedor,
  Cliente,
  Moderador,
}

impl KnownRole {
  /// Human-readable label shown in the admin console.
  pub fn label(self) -> &'static str {
    match self {
      Self::Admin => "Administrador",
      Self::Vendedor => "Vendedor",
      Self::Cliente => "Cliente",
      Self::Moderador => "Moderador",
    }
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// One selectable role in the admin role picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
  pub id:    String,
  /// Canonical role value.
  pub value: String,
  pub label: String,
}

impl RoleRecord {
  /// The catalog used when the API has none to offer (demo mode, or the
  /// roles endpoint failed).
  pub fn fallback_catalog() -> Vec<RoleRecord> {
    KnownRole::iter()
      .map(|role| RoleRecord {
        id:    role.to_string(),
        value: role.to_string(),
        label: role.label().to_string(),
      })
      .collect()
  }
}

/// Every role value an admin may assign: the known roles, then catalog
/// values, then roles already held by `users`.
///
/// Values are canonicalised and de-duplicated in first-seen order; empty
/// values and legacy synonyms are dropped. Never empty, since the known roles
/// always come first.
pub fn available_roles(
  catalog: &[RoleRecord],
  users: &[NormalizedUser],
) -> Vec<String> {
  let candidates = KnownRole::iter()
    .map(|role| role.to_string())
    .chain(catalog.iter().map(|r| canonical_role(&r.value)))
    .chain(
      users
        .iter()
        .flat_map(|u| u.roles.iter().map(|r| canonical_role(r))),
    );

  let mut seen = HashSet::new();
  let mut roles = Vec::new();
  for role in candidates {
    if role.is_empty() || is_legacy_synonym(&role) {
      continue;
    }
    if seen.insert(role.clone()) {
      roles.push(role);
    }
  }
  roles
}

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Role value → display label lookup.
///
/// Catalog labels take priority; known roles and their legacy synonyms fill
/// in the rest. Unknown roles render as their uppercased value.
#[derive(Debug, Clone)]
pub struct RoleLabels {
  labels: HashMap<String, String>,
}

impl RoleLabels {
  pub fn new(catalog: &[RoleRecord]) -> Self {
    let mut labels: HashMap<String, String> = catalog
      .iter()
      .map(|r| (canonical_role(&r.value), r.label.clone()))
      .collect();

    for role in KnownRole::iter() {
      labels
        .entry(role.to_string())
        .or_insert_with(|| role.label().to_string());
    }
    for (legacy, canonical) in ROLE_SYNONYMS {
      if let Ok(role) = canonical.parse::<KnownRole>() {
        labels
          .entry((*legacy).to_string())
          .or_insert_with(|| role.label().to_string());
      }
    }

    Self { labels }
  }

  pub fn label(&self, role: &str) -> String {
    self
      .labels
      .get(&role.to_lowercase())
      .cloned()
      .unwrap_or_else(|| role.to_uppercase())
  }
}

impl Default for RoleLabels {
  fn default() -> Self { Self::new(&[]) }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
