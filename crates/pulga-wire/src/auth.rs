//! Auth responses (`/auth/login`, `/auth/register`).
//!
//! Auth payloads already use the canonical field names, so only the nested
//! user's roles are normalised in place. [`AuthSession`] is the typed view
//! the client persists.

use pulga_core::{session::Session, user::NormalizedUser};
use serde_json::Value;

use crate::{
  fields::first_str,
  role::normalise_role_value,
  user::map_user_record,
};

const TOKEN_KEYS: &[&str] = &["access_token", "accessToken", "token"];
const REDIRECT_KEYS: &[&str] = &["redirectTo", "redirect_to"];

/// Canonicalise the roles of `data.user`, leaving every other field alone.
///
/// Without a nested user object the payload is returned unchanged. A user
/// whose `roles` is missing or not a list gets an empty list.
pub fn normalise_auth_response(mut data: Value) -> Value {
  let Some(user) = data.get_mut("user").and_then(Value::as_object_mut) else {
    return data;
  };

  let roles: Vec<Value> = user
    .get("roles")
    .and_then(Value::as_array)
    .map(|roles| {
      roles
        .iter()
        .map(normalise_role_value)
        .filter(|r| !r.is_empty())
        .map(Value::String)
        .collect()
    })
    .unwrap_or_default();
  user.insert("roles".to_string(), Value::Array(roles));

  data
}

/// The parts of an auth response the client keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
  pub access_token: Option<String>,
  pub user:         Option<NormalizedUser>,
  /// Server-suggested landing route, if any.
  pub redirect_to:  Option<String>,
}

impl AuthSession {
  pub fn from_response(data: &Value) -> Self {
    let Some(obj) = data.as_object() else {
      return Self::default();
    };
    Self {
      access_token: first_str(obj, TOKEN_KEYS).map(str::to_string),
      user:         obj
        .get("user")
        .filter(|u| u.is_object())
        .map(map_user_record),
      redirect_to:  first_str(obj, REDIRECT_KEYS).map(str::to_string),
    }
  }

  pub fn into_session(self) -> Session {
    Session::logged_in(self.access_token, self.user, self.redirect_to.as_deref())
  }
}

/// Normalise an auth response and build the session to persist from it.
pub fn session_from_auth_response(data: Value) -> (Value, Session) {
  let data = normalise_auth_response(data);
  let session = AuthSession::from_response(&data).into_session();
  (data, session)
}
