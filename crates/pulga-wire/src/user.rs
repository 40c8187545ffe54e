//! User records from the wire.

use pulga_core::{rut::normalise_rut, user::NormalizedUser};
use serde_json::Value;

use crate::{
  fields::{UserSchema, find_rut, first_array, first_bool, first_str, first_text},
  role::normalise_role_list,
};

/// Map a raw user object using the current (English-first) precedence.
pub fn map_user_record(raw: &Value) -> NormalizedUser {
  map_user_record_with(raw, UserSchema::English)
}

/// Map a raw user object using the precedence of `schema`.
///
/// Never fails: a non-object, or an object with nothing recognisable, maps to
/// a user whose text fields are `""` and whose lists are empty.
pub fn map_user_record_with(raw: &Value, schema: UserSchema) -> NormalizedUser {
  let Some(obj) = raw.as_object() else {
    return NormalizedUser::default();
  };
  let f = schema.fields();
  let text = |keys: &[&str]| first_str(obj, keys).unwrap_or_default().to_string();
  let optional = |keys: &[&str]| first_str(obj, keys).map(str::to_string);

  NormalizedUser {
    id:          first_text(obj, f.id).unwrap_or_default(),
    name:        text(f.name),
    last_name:   text(f.last_name),
    email:       text(f.email),
    rut:         find_rut(obj, f)
      .map(|r| normalise_rut(&r))
      .unwrap_or_default(),
    phone:       first_text(obj, f.phone),
    photo:       optional(f.photo),
    roles:       first_array(obj, f.roles)
      .map(|roles| normalise_role_list(roles))
      .unwrap_or_default(),
    permissions: first_array(obj, f.permissions)
      .map(|p| string_list(p))
      .unwrap_or_default(),
    active:      first_bool(obj, f.active),
    created_at:  optional(f.created_at),
    updated_at:  optional(f.updated_at),
  }
}

/// Map a users endpoint body. Anything but a JSON list yields no users.
pub fn map_users(raw: &Value) -> Vec<NormalizedUser> {
  match raw.as_array() {
    Some(rows) => rows.iter().map(map_user_record).collect(),
    None => {
      tracing::debug!("users body is not a list; returning no users");
      Vec::new()
    }
  }
}

fn string_list(values: &[Value]) -> Vec<String> {
  values
    .iter()
    .filter_map(Value::as_str)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}
