//! Outgoing request bodies.
//!
//! Form values are trimmed and canonicalised here, right before they leave
//! the client: emails lowercased, RUTs normalised, roles canonical.

use pulga_core::{
  role::canonical_role,
  rut::{normalise_rut, sanitise_rut_input},
  validate::{AccreditationForm, MIN_PASSWORD_LEN, ProfileForm, RegisterForm, UserForm},
};
use serde_json::{Map, Value, json};

/// Every key some API version has accepted a new password under. The admin
/// form fills all of them; [`sanitise_user_payload`] collapses them.
pub const PASSWORD_KEYS: &[&str] = &[
  "password",
  "newPassword",
  "passwordConfirmation",
  "password_confirmation",
  "confirmPassword",
  "password_confirm",
];

const PASSWORD_KEY: &str = "password";

fn long_enough(s: &str) -> bool { s.chars().count() >= MIN_PASSWORD_LEN }

/// Collapse the password aliases of a user payload into a single `password`.
///
/// The last alias holding a trimmed string of at least
/// [`MIN_PASSWORD_LEN`] characters wins. All other aliases are removed, and
/// a `password` too short to be accepted is dropped. Hashing is the API's
/// job; the password is sent as typed, minus surrounding whitespace.
pub fn sanitise_user_payload(mut payload: Map<String, Value>) -> Map<String, Value> {
  let mut candidate: Option<String> = None;

  for key in PASSWORD_KEYS {
    if let Some(Value::String(value)) = payload.get(*key)
      && long_enough(value.trim())
    {
      candidate = Some(value.trim().to_string());
    }
    if *key != PASSWORD_KEY {
      payload.remove(*key);
    }
  }

  match candidate {
    Some(password) => {
      payload.insert(PASSWORD_KEY.to_string(), Value::String(password));
    }
    None => {
      if let Some(Value::String(value)) = payload.get(PASSWORD_KEY)
        && !long_enough(value.trim())
      {
        payload.remove(PASSWORD_KEY);
      }
    }
  }

  payload
}

/// Canonical, non-empty, de-duplicated role values.
fn canonical_roles(roles: &[String]) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(roles.len());
  for role in roles.iter().map(|r| canonical_role(r)) {
    if !role.is_empty() && !out.contains(&role) {
      out.push(role);
    }
  }
  out
}

/// Body for `POST /users` and `PATCH /users/{id}` from the admin dialog.
///
/// A blank RUT is omitted rather than sent empty. When a password was typed
/// it is written under every alias in [`PASSWORD_KEYS`]; run the result
/// through [`sanitise_user_payload`] before sending.
pub fn user_form_payload(form: &UserForm) -> Map<String, Value> {
  let mut payload = Map::new();
  payload.insert("name".into(), json!(form.name.trim()));
  payload.insert("lastName".into(), json!(form.last_name.trim()));
  payload.insert("email".into(), json!(form.email.trim().to_lowercase()));

  let rut = normalise_rut(&form.rut);
  if !rut.is_empty() {
    payload.insert("rut".into(), json!(rut));
  }
  payload.insert("roles".into(), json!(canonical_roles(&form.roles)));

  let password = form.password.trim();
  if !password.is_empty() {
    for key in PASSWORD_KEYS {
      payload.insert((*key).to_string(), json!(password));
    }
  }
  payload
}

/// Body for `PATCH /users/{id}` when users edit their own profile.
///
/// Only the fields the form carries are sent. A new password goes out under
/// `password` alone; the confirmation never leaves the client.
pub fn profile_payload(form: &ProfileForm) -> Map<String, Value> {
  let mut payload = Map::new();
  let mut put = |key: &str, value: Option<String>| {
    if let Some(value) = value {
      payload.insert(key.to_string(), Value::String(value));
    }
  };
  put("name", form.name.as_deref().map(|s| s.trim().to_string()));
  put("lastName", form.last_name.as_deref().map(|s| s.trim().to_string()));
  put("email", form.email.as_deref().map(|s| s.trim().to_lowercase()));
  put("phone", form.phone.as_deref().map(|s| s.trim().to_string()));
  put("bio", form.bio.clone());
  put("photo", form.photo.as_deref().map(|s| s.trim().to_string()));
  if form.changes_password() {
    put(PASSWORD_KEY, Some(form.password.trim().to_string()));
  }
  payload
}

/// Body for `POST /auth/register`.
pub fn register_payload(form: &RegisterForm) -> Value {
  json!({
    "name": form.name.trim(),
    "lastName": form.last_name.trim(),
    "rut": normalise_rut(form.rut.trim()),
    "email": form.email.trim().to_lowercase(),
    "password": form.password,
  })
}

/// Body for `POST /auth/login`.
pub fn login_payload(email: &str, password: &str) -> Value {
  json!({ "email": email.trim().to_lowercase(), "password": password })
}

/// Body for `POST /auth/forgot-password`.
pub fn password_reset_payload(email: &str) -> Value {
  json!({ "email": email.trim().to_lowercase() })
}

/// Body for a new vendor accreditation request. The company RUT is sent
/// sanitised (dots and stray characters removed) but otherwise as typed.
pub fn accreditation_payload(form: &AccreditationForm) -> Value {
  json!({
    "storeName": form.store_name.trim(),
    "contactNumber": form.contact_number.trim(),
    "companyRut": sanitise_rut_input(form.company_rut.trim()),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn map(v: Value) -> Map<String, Value> { v.as_object().cloned().unwrap() }

  #[test]
  fn aliases_collapse_into_password() {
    let out = sanitise_user_payload(map(json!({
      "name": "Ana",
      "newPassword": "  secreto  ",
      "confirmPassword": "secreto",
    })));
    assert_eq!(out["password"], "secreto");
    assert_eq!(out["name"], "Ana");
    for key in &PASSWORD_KEYS[1..] {
      assert!(!out.contains_key(*key), "{key} should be removed");
    }
  }

  #[test]
  fn last_long_enough_alias_wins() {
    let out = sanitise_user_payload(map(json!({
      "password": "primero1",
      "password_confirm": "segundo2",
      "confirmPassword": "abc",
    })));
    assert_eq!(out["password"], "segundo2");
  }

  #[test]
  fn short_password_is_dropped() {
    let out = sanitise_user_payload(map(json!({ "password": " 123 ", "email": "a@b.cl" })));
    assert!(!out.contains_key("password"));
    assert_eq!(out["email"], "a@b.cl");
  }

  #[test]
  fn payload_without_password_is_left_alone() {
    let input = map(json!({ "name": "Ana", "roles": ["admin"] }));
    assert_eq!(sanitise_user_payload(input.clone()), input);
  }

  #[test]
  fn user_form_payload_canonicalises_fields() {
    let form = UserForm {
      id:        Some("7".into()),
      name:      " Ana ".into(),
      last_name: "Rojas".into(),
      email:     " ANA@Demo.CL".into(),
      rut:       "12.345.678-k".into(),
      roles:     vec!["Usuario".into(), "cliente".into(), "ADMIN".into()],
      password:  String::new(),
    };
    let payload = user_form_payload(&form);
    assert_eq!(payload["name"], "Ana");
    assert_eq!(payload["email"], "ana@demo.cl");
    assert_eq!(payload["rut"], "12345678-K");
    assert_eq!(payload["roles"], json!(["cliente", "admin"]));
    assert!(!payload.contains_key("password"));
  }

  #[test]
  fn user_form_payload_omits_blank_rut_and_fills_password_aliases() {
    let form = UserForm {
      name: "Ana".into(),
      password: " secreto ".into(),
      ..UserForm::default()
    };
    let payload = user_form_payload(&form);
    assert!(!payload.contains_key("rut"));
    for key in PASSWORD_KEYS {
      assert_eq!(payload[*key], "secreto");
    }
    let sent = sanitise_user_payload(payload);
    assert_eq!(sent["password"], "secreto");
    assert!(!sent.contains_key("newPassword"));
  }

  #[test]
  fn profile_payload_sends_only_given_fields() {
    let form = ProfileForm {
      email: Some(" Ana@Demo.CL ".into()),
      phone: Some(" +56 9 1234 5678 ".into()),
      ..ProfileForm::default()
    };
    let payload = profile_payload(&form);
    assert_eq!(payload.len(), 2);
    assert_eq!(payload["email"], "ana@demo.cl");
    assert_eq!(payload["phone"], "+56 9 1234 5678");
  }

  #[test]
  fn profile_payload_carries_a_new_password_once() {
    let form = ProfileForm {
      name: Some(" Ana ".into()),
      bio: Some("Vendo ropa usada".into()),
      password: " secreto ".into(),
      repeat: " secreto ".into(),
      ..ProfileForm::default()
    };
    let sent = sanitise_user_payload(profile_payload(&form));
    assert_eq!(sent["name"], "Ana");
    assert_eq!(sent["bio"], "Vendo ropa usada");
    assert_eq!(sent["password"], "secreto");
    assert!(!sent.contains_key("passwordConfirmation"));
    assert!(!sent.contains_key("lastName"));
  }

  #[test]
  fn accreditation_payload_sanitises_rut() {
    let body = accreditation_payload(&AccreditationForm {
      store_name:     " Tienda ".into(),
      contact_number: "+56 9 1234 5678".into(),
      company_rut:    " 76.543.210-k ".into(),
    });
    assert_eq!(body["storeName"], "Tienda");
    assert_eq!(body["companyRut"], "76543210-K");
  }

  #[test]
  fn register_payload_normalises_rut_and_email() {
    let body = register_payload(&RegisterForm {
      rut: "12.345.678-5".into(),
      name: "Ana".into(),
      last_name: "Rojas".into(),
      email: "Ana@Demo.cl ".into(),
      password: "secreto".into(),
      repeat: "secreto".into(),
      terms_accepted: true,
    });
    assert_eq!(body["rut"], "12345678-5");
    assert_eq!(body["email"], "ana@demo.cl");
    assert!(body.get("repeat").is_none());
  }
}
