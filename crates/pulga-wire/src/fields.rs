//! Field-name precedence tables and the lookups that walk them.
//!
//! The API has renamed its fields over time (`name`/`nombre`,
//! `email`/`correo`, …). Each canonical field resolves from the first key in
//! its table that holds a usable value. A schema change is a one-line edit to
//! one of the tables below.

use serde_json::{Map, Value};

/// Ordered source keys for every canonical user field.
#[derive(Debug)]
pub struct UserFields {
  pub id:             &'static [&'static str],
  pub name:           &'static [&'static str],
  pub last_name:      &'static [&'static str],
  pub email:          &'static [&'static str],
  pub phone:          &'static [&'static str],
  pub photo:          &'static [&'static str],
  pub roles:          &'static [&'static str],
  pub permissions:    &'static [&'static str],
  pub active:         &'static [&'static str],
  pub created_at:     &'static [&'static str],
  pub updated_at:     &'static [&'static str],
  /// Top-level RUT aliases, also tried inside each of `rut_containers`.
  pub rut:            &'static [&'static str],
  pub rut_containers: &'static [&'static str],
}

const RUT_KEYS: &[&str] = &["rut", "RUT", "Rut", "run", "dni", "documento"];

const RUT_CONTAINERS: &[&str] =
  &["perfil", "profile", "persona", "identificacion", "datosPersonales"];

/// English keys first: the current API schema.
pub const ENGLISH_FIRST: UserFields = UserFields {
  id:             &["id", "_id"],
  name:           &["name", "nombre"],
  last_name:      &["lastName", "apellido"],
  email:          &["email", "correo"],
  phone:          &["phone", "telefono"],
  photo:          &["photo", "foto"],
  roles:          &["roles"],
  permissions:    &["permissions", "permisos"],
  active:         &["isActive", "activo"],
  created_at:     &["createdAt", "creado_en"],
  updated_at:     &["updatedAt", "actualizado_en"],
  rut:            RUT_KEYS,
  rut_containers: RUT_CONTAINERS,
};

/// Spanish keys first: endpoints still on the older schema.
pub const SPANISH_FIRST: UserFields = UserFields {
  id:             &["id", "_id"],
  name:           &["nombre", "name"],
  last_name:      &["apellido", "lastName"],
  email:          &["correo", "email"],
  phone:          &["telefono", "phone"],
  photo:          &["foto", "photo"],
  roles:          &["roles"],
  permissions:    &["permisos", "permissions"],
  active:         &["activo", "isActive"],
  created_at:     &["creado_en", "createdAt"],
  updated_at:     &["actualizado_en", "updatedAt"],
  rut:            RUT_KEYS,
  rut_containers: RUT_CONTAINERS,
};

/// Which naming convention wins when a payload carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSchema {
  #[default]
  English,
  Spanish,
}

impl UserSchema {
  pub fn fields(self) -> &'static UserFields {
    match self {
      Self::English => &ENGLISH_FIRST,
      Self::Spanish => &SPANISH_FIRST,
    }
  }
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

/// First non-empty string under any of `keys`.
pub(crate) fn first_str<'a>(
  obj: &'a Map<String, Value>,
  keys: &[&str],
) -> Option<&'a str> {
  keys
    .iter()
    .filter_map(|k| obj.get(*k).and_then(Value::as_str))
    .find(|s| !s.is_empty())
}

/// First non-empty string or number under any of `keys`, as a string.
/// Used for identifiers, which some endpoints send as numbers.
pub(crate) fn first_text(
  obj: &Map<String, Value>,
  keys: &[&str],
) -> Option<String> {
  keys.iter().find_map(|k| match obj.get(*k) {
    Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
    Some(Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

/// First value under any of `keys` that counts as present: a non-empty
/// string, a non-zero number, `true`, or any array or object.
///
/// Unlike [`first_str`] this does not skip a present value of the wrong type,
/// so a numeric `slug` shadows a string `name` further down the table.
pub(crate) fn first_present<'a>(
  obj: &'a Map<String, Value>,
  keys: &[&str],
) -> Option<&'a Value> {
  keys.iter().filter_map(|k| obj.get(*k)).find(|v| match v {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  })
}

/// Text form of a scalar JSON value; arrays and objects render as JSON.
pub(crate) fn value_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

pub(crate) fn first_bool(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
  keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_bool))
}

/// First array under any of `keys`.
pub(crate) fn first_array<'a>(
  obj: &'a Map<String, Value>,
  keys: &[&str],
) -> Option<&'a Vec<Value>> {
  keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_array))
}

/// Search the top level, then each nested container in order, for the first
/// RUT-like value.
pub(crate) fn find_rut(obj: &Map<String, Value>, fields: &UserFields) -> Option<String> {
  first_text(obj, fields.rut).or_else(|| {
    fields.rut_containers.iter().find_map(|container| {
      obj
        .get(*container)
        .and_then(Value::as_object)
        .and_then(|nested| first_text(nested, fields.rut))
    })
  })
}
