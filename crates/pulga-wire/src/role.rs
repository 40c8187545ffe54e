//! Role values and role-catalog rows from the wire.

use pulga_core::role::{RoleRecord, canonical_role};
use serde_json::Value;

use crate::fields::{first_present, first_text, value_text};

/// Keys a catalog row may carry its role value under, in precedence order.
pub const CATALOG_VALUE_KEYS: &[&str] = &["slug", "key", "value", "name"];

/// Keys a catalog row may carry its display label under, in precedence order.
pub const CATALOG_LABEL_KEYS: &[&str] =
  &["displayName", "name", "slug", "key", "value"];

const CATALOG_ID_KEYS: &[&str] = &["id", "_id"];

/// Canonicalise an arbitrary JSON role value.
///
/// Non-strings yield `""`; strings are trimmed, lowercased and resolved
/// through the synonym table (`"Usuario"` → `"cliente"`).
pub fn normalise_role_value(role: &Value) -> String {
  role.as_str().map(canonical_role).unwrap_or_default()
}

/// Canonical, non-empty role values from a JSON list, de-duplicated in
/// first-seen order.
pub fn normalise_role_list(roles: &[Value]) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(roles.len());
  for role in roles.iter().map(normalise_role_value) {
    if !role.is_empty() && !out.contains(&role) {
      out.push(role);
    }
  }
  out
}

/// Map one raw catalog row to a [`RoleRecord`].
///
/// The value is the first present entry of [`CATALOG_VALUE_KEYS`], whatever
/// its type, put through [`normalise_role_value`]; a non-string value there
/// therefore makes the row unusable rather than falling through to the next
/// key. The label is the first present entry of [`CATALOG_LABEL_KEYS`] in
/// text form.
///
/// Returns `None` when no usable value or label can be found; such rows are
/// not catalog entries and the caller should skip them. The id falls back to
/// the role value.
pub fn map_role_catalog_entry(raw: &Value) -> Option<RoleRecord> {
  let obj = raw.as_object()?;

  let value = normalise_role_value(first_present(obj, CATALOG_VALUE_KEYS)?);
  if value.is_empty() {
    return None;
  }
  let label = value_text(first_present(obj, CATALOG_LABEL_KEYS)?);
  let id = first_text(obj, CATALOG_ID_KEYS).unwrap_or_else(|| value.clone());

  Some(RoleRecord { id, value, label })
}

/// Map a roles endpoint body. Anything but a JSON list yields an empty
/// catalog; unusable rows are dropped.
pub fn map_role_catalog(raw: &Value) -> Vec<RoleRecord> {
  let Some(rows) = raw.as_array() else {
    tracing::debug!("role catalog body is not a list; using empty catalog");
    return Vec::new();
  };
  rows
    .iter()
    .filter_map(|row| {
      let entry = map_role_catalog_entry(row);
      if entry.is_none() {
        tracing::debug!(%row, "skipping role catalog row without value or label");
      }
      entry
    })
    .collect()
}
