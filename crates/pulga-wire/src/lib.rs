//! Record normalizer for the PulgaShop API.
//!
//! Maps JSON bodies from the marketplace API into [`pulga_core`] types, and
//! builds the bodies the client sends back. Pure synchronous; no HTTP.
//!
//! The API has renamed its fields more than once (English vs. Spanish keys,
//! `usuario` vs. `cliente`), so every field resolves through an ordered key
//! table in [`fields`]. Mapping a [`serde_json::Value`] never fails: missing
//! or malformed fields degrade to `""`, an empty list, or `None`.
//!
//! # Quick start
//!
//! ```no_run
//! use pulga_wire::parse_user;
//!
//! let body = r#"{ "_id": "7", "nombre": "Ana", "roles": ["Usuario"] }"#;
//! let user = parse_user(body).unwrap();
//! assert_eq!(user.roles, ["cliente"]);
//! ```

pub mod accreditation;
pub mod auth;
pub mod error;
pub mod fields;
pub mod payload;
pub mod role;
pub mod user;

pub use accreditation::{map_accreditation_request, map_accreditation_requests};
pub use auth::{AuthSession, normalise_auth_response, session_from_auth_response};
pub use error::{Error, Result};
pub use fields::UserSchema;
use pulga_core::{role::RoleRecord, user::NormalizedUser};
pub use role::{map_role_catalog, map_role_catalog_entry, normalise_role_value};
use serde_json::Value;
pub use user::{map_user_record, map_user_record_with, map_users};

// ─── Text entry points ───────────────────────────────────────────────────────

/// Decode and map a single user object.
pub fn parse_user(body: &str) -> Result<NormalizedUser> {
  let value: Value = serde_json::from_str(body)?;
  Ok(map_user_record(&value))
}

/// Decode and map a users list body.
pub fn parse_users(body: &str) -> Result<Vec<NormalizedUser>> {
  let value: Value = serde_json::from_str(body)?;
  Ok(map_users(&value))
}

/// Decode and map a role catalog body, dropping unusable rows.
pub fn parse_role_catalog(body: &str) -> Result<Vec<RoleRecord>> {
  let value: Value = serde_json::from_str(body)?;
  Ok(map_role_catalog(&value))
}

/// Decode an auth response and normalise its nested user's roles.
pub fn parse_auth_response(body: &str) -> Result<Value> {
  let value: Value = serde_json::from_str(body)?;
  Ok(normalise_auth_response(value))
}

// ─── Scenario tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
  use pulga_core::{
    role::{RoleLabels, available_roles},
    search::filter_users,
    session::{MemorySessionStore, SessionStore},
  };

  use super::*;

  const USERS_BODY: &str = r#"[
    { "_id": "7", "nombre": "Ana", "correo": "a@b.com",
      "roles": ["Usuario", "usuario", "ADMIN"] },
    { "id": 8, "name": "Bruno", "lastName": "Soto", "email": "bruno@pulga.cl",
      "perfil": { "rut": "9.876.543-3" }, "roles": ["vendedor"] },
    "not a user"
  ]"#;

  #[test]
  fn users_list_maps_every_row() {
    let users = parse_users(USERS_BODY).unwrap();
    assert_eq!(users.len(), 3);

    assert_eq!(users[0].id, "7");
    assert_eq!(users[0].roles, ["cliente", "admin"]);
    assert!(users[0].is_admin());

    assert_eq!(users[1].id, "8");
    assert_eq!(users[1].rut, "9876543-3");
    assert_eq!(users[1].formatted_rut(), "9.876.543-3");

    assert_eq!(users[2], NormalizedUser::default());
  }

  #[test]
  fn every_mapped_user_has_canonical_roles() {
    for user in parse_users(USERS_BODY).unwrap() {
      for role in &user.roles {
        assert!(!role.is_empty());
        assert_eq!(role, &role.trim().to_lowercase());
        assert_ne!(role, "usuario");
        assert_ne!(role, "user");
      }
    }
  }

  #[test]
  fn admin_search_finds_users_by_dotted_or_bare_rut() {
    let users = parse_users(USERS_BODY).unwrap();
    let hits = filter_users(&users, "98765433");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Bruno");

    let hits = filter_users(&users, "9.876.543");
    assert_eq!(hits.len(), 1);
  }

  #[test]
  fn catalog_drives_labels_and_role_picker() {
    let catalog = parse_role_catalog(
      r#"[
        { "_id": "r1", "slug": "admin", "displayName": "Administración" },
        { "slug": "", "name": "" },
        { "key": "soporte", "name": "Soporte" }
      ]"#,
    )
    .unwrap();
    assert_eq!(catalog.len(), 2);

    let labels = RoleLabels::new(&catalog);
    assert_eq!(labels.label("admin"), "Administración");
    assert_eq!(labels.label("soporte"), "Soporte");
    assert_eq!(labels.label("usuario"), "Cliente");

    let users = parse_users(USERS_BODY).unwrap();
    let roles = available_roles(&catalog, &users);
    assert!(roles.iter().any(|r| r == "soporte"));
    assert!(roles.iter().any(|r| r == "vendedor"));
    assert!(!roles.iter().any(|r| r == "usuario"));
  }

  #[test]
  fn login_response_round_trips_through_a_session_store() {
    let data: Value = serde_json::from_str(
      r#"{ "access_token": "tok", "user": { "id": "1", "nombre": "Ana",
           "roles": ["Usuario"] } }"#,
    )
    .unwrap();
    let (data, session) = session_from_auth_response(data);
    assert_eq!(data["user"]["nombre"], "Ana");
    assert_eq!(session.redirect_to.as_deref(), Some("/dashboard"));

    let store = MemorySessionStore::default();
    store.set(&session).unwrap();
    let restored = store.get().unwrap();
    assert_eq!(restored, session);
    assert_eq!(restored.user.unwrap().name, "Ana");

    store.clear().unwrap();
    assert!(!store.get().unwrap().is_logged_in);
  }

  #[test]
  fn invalid_json_is_an_error_not_a_panic() {
    assert!(matches!(parse_user("{"), Err(Error::Json(_))));
    assert!(parse_users("").is_err());
    assert!(parse_role_catalog("[").is_err());
    assert!(parse_auth_response("nope").is_err());
  }

  #[test]
  fn valid_json_of_the_wrong_shape_degrades() {
    assert!(parse_users("{}").unwrap().is_empty());
    assert!(parse_role_catalog("null").unwrap().is_empty());
    assert_eq!(parse_user("[]").unwrap(), NormalizedUser::default());
    assert_eq!(parse_auth_response("42").unwrap(), 42);
  }
}
