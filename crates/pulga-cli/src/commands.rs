//! Subcommand handlers. Results go to stdout as JSON; logs go to stderr.

use std::io::{self, BufRead, Read, Write};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use pulga_core::{
  role::{RoleLabels, RoleRecord, available_roles},
  rut::{self, Rut},
  search::filter_users,
  session::{Session, SessionStore},
  validate::{
    AccreditationForm, LoginForm, ProfileForm, RegisterForm, UserForm,
    ValidationError, is_email_shaped,
  },
};
use pulga_wire::payload;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{client::ApiClient, session_file::FileSessionStore};

// ─── Output helpers ───────────────────────────────────────────────────────────

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  let out = serde_json::to_string_pretty(value).context("encoding output")?;
  println!("{out}");
  Ok(())
}

/// Read one line from stdin, prompting on stderr.
pub fn prompt_line(prompt: &str) -> Result<String> {
  eprint!("{prompt}");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("reading from stdin")?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Fail with the form's own message when validation rejects it.
fn check(result: Result<(), ValidationError>) -> Result<()> {
  result.map_err(|e| anyhow::anyhow!("invalid input: {e}"))
}

/// Refuse to continue unless the stored session belongs to an admin.
pub fn require_admin(session: &Session) -> Result<()> {
  if !session.is_logged_in {
    bail!("not logged in; run `pulga login` first");
  }
  if !session.is_admin() {
    bail!("this command requires the admin role");
  }
  Ok(())
}

fn require_login(session: &Session) -> Result<()> {
  if !session.is_logged_in {
    bail!("not logged in; run `pulga login` first");
  }
  Ok(())
}

// ─── rut ──────────────────────────────────────────────────────────────────────

/// Everything the RUT utility can say about `input`.
///
/// Format validity and the modulo-11 verdict are reported separately; the
/// latter is `null` when the input is not format-valid.
pub fn rut_report(input: &str) -> Value {
  let parsed = input.parse::<Rut>().ok();
  json!({
    "input":           input,
    "sanitised":       rut::sanitise_rut_input(input),
    "canonical":       rut::normalise_rut(input),
    "formatted":       rut::format_rut(input),
    "formatValid":     rut::is_rut_format_valid(input),
    "checkDigitValid": parsed.as_ref().map(Rut::has_valid_check_char),
  })
}

// ─── normalize ────────────────────────────────────────────────────────────────

/// Which normalizer to run over a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormalizeKind {
  /// One user object.
  User,
  /// A list of user objects.
  Users,
  /// A role catalog list.
  Roles,
  /// An auth (login/register) response.
  Auth,
}

pub fn normalize(kind: NormalizeKind, body: &str) -> Result<Value> {
  let value = match kind {
    NormalizeKind::User => serde_json::to_value(pulga_wire::parse_user(body)?)?,
    NormalizeKind::Users => serde_json::to_value(pulga_wire::parse_users(body)?)?,
    NormalizeKind::Roles => {
      serde_json::to_value(pulga_wire::parse_role_catalog(body)?)?
    }
    NormalizeKind::Auth => pulga_wire::parse_auth_response(body)?,
  };
  Ok(value)
}

/// Read a whole document from `path`, or from stdin when `None` or `-`.
pub fn read_input(path: Option<&std::path::Path>) -> Result<String> {
  match path {
    Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
      .with_context(|| format!("reading {}", p.display())),
    _ => {
      let mut buf = String::new();
      io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
      Ok(buf)
    }
  }
}

// ─── Auth ─────────────────────────────────────────────────────────────────────

pub async fn login(
  client: &ApiClient,
  store: &FileSessionStore,
  email: String,
  password: String,
) -> Result<()> {
  let form = LoginForm { email, password };
  check(form.validate())?;

  let body = payload::login_payload(&form.email, &form.password);
  let data = client.login(&body).await?;
  let (_, session) = pulga_wire::session_from_auth_response(data);
  if !session.is_logged_in {
    bail!("login response carried no access token");
  }
  store.set(&session)?;
  tracing::info!(path = %store.path().display(), "logged in");

  print_json(&json!({
    "user":       session.user,
    "redirectTo": session.redirect_to,
  }))
}

pub async fn register(
  client: &ApiClient,
  store: &FileSessionStore,
  form: RegisterForm,
) -> Result<()> {
  check(form.validate())?;

  let data = client.register(&payload::register_payload(&form)).await?;
  let (data, session) = pulga_wire::session_from_auth_response(data);
  if session.is_logged_in {
    store.set(&session)?;
  }
  print_json(&data)
}

pub async fn reset_password(client: &ApiClient, email: &str) -> Result<()> {
  if !is_email_shaped(email.trim()) {
    return check(Err(ValidationError::InvalidEmail));
  }
  let data = client
    .forgot_password(&payload::password_reset_payload(email))
    .await?;
  print_json(&data)
}

pub fn logout(store: &FileSessionStore) -> Result<()> {
  store.clear()?;
  print_json(&json!({ "isLoggedIn": false }))
}

/// Print the current user. Asks the API first and falls back to the user
/// stored at login when the API cannot be reached.
pub async fn whoami(client: &ApiClient, session: &Session) -> Result<()> {
  require_login(session)?;
  let user = match client.me().await {
    Ok(user) => Some(user),
    Err(e) => {
      tracing::warn!(error = %e, "profile request failed; using stored user");
      session.user.clone()
    }
  };
  print_json(&json!({
    "user":         user,
    "landingRoute": session.landing_route(),
  }))
}

// ─── Own profile ──────────────────────────────────────────────────────────────

/// Validate a profile edit and build the body to send.
fn profile_update_body(form: &ProfileForm) -> Result<Map<String, Value>> {
  check(form.validate())?;
  Ok(payload::profile_payload(form))
}

/// Update the logged-in user's own account. The id comes from `/auth/me`,
/// and the stored session is refreshed with the updated user.
pub async fn profile_update(
  client: &ApiClient,
  store: &FileSessionStore,
  session: &Session,
  form: ProfileForm,
) -> Result<()> {
  require_login(session)?;
  let body = profile_update_body(&form)?;

  let me = client.me().await?;
  if me.id.is_empty() {
    bail!("profile response carried no user id");
  }
  let updated = client.update_user(&me.id, body).await?;

  let mut refreshed = session.clone();
  refreshed.user = Some(if updated.id.is_empty() { me } else { updated.clone() });
  store.set(&refreshed)?;

  print_json(&updated)
}

// ─── Users ────────────────────────────────────────────────────────────────────

pub async fn users_list(
  client: &ApiClient,
  session: &Session,
  search: Option<&str>,
) -> Result<()> {
  require_admin(session)?;
  let users = client.list_users().await?;
  let shown = filter_users(&users, search.unwrap_or_default());
  print_json(&shown)
}

pub async fn users_delete(client: &ApiClient, session: &Session, id: &str) -> Result<()> {
  require_admin(session)?;
  client.delete_user(id).await?;
  print_json(&json!({ "deleted": id }))
}

/// Create the user when `form.id` is empty, otherwise update it.
pub async fn users_save(client: &ApiClient, session: &Session, form: UserForm) -> Result<()> {
  require_admin(session)?;
  check(form.validate())?;

  let body = payload::user_form_payload(&form);
  let user = match form.id.as_deref().filter(|_| !form.is_new()) {
    Some(id) => client.update_user(id, body).await?,
    None => client.create_user(body).await?,
  };
  print_json(&user)
}

// ─── Roles ────────────────────────────────────────────────────────────────────

/// The role catalog with display labels, plus every assignable role value.
///
/// Falls back to the built-in catalog when the API has none to offer.
pub async fn roles(client: &ApiClient) -> Result<()> {
  let catalog = match client.roles().await {
    Ok(catalog) if !catalog.is_empty() => catalog,
    Ok(_) => {
      tracing::warn!("role catalog is empty; using built-in roles");
      RoleRecord::fallback_catalog()
    }
    Err(e) => {
      tracing::warn!(error = %e, "role catalog unavailable; using built-in roles");
      RoleRecord::fallback_catalog()
    }
  };
  print_json(&roles_view(&catalog))
}

fn roles_view(catalog: &[RoleRecord]) -> Value {
  let labels = RoleLabels::new(catalog);
  let assignable: Vec<Value> = available_roles(catalog, &[])
    .into_iter()
    .map(|value| json!({ "label": labels.label(&value), "value": value }))
    .collect();
  json!({ "catalog": catalog, "assignable": assignable })
}

// ─── Vendor accreditation ─────────────────────────────────────────────────────

pub async fn vendor_request(
  client: &ApiClient,
  session: &Session,
  form: AccreditationForm,
) -> Result<()> {
  require_login(session)?;
  check(form.validate())?;
  let request = client
    .request_accreditation(&payload::accreditation_payload(&form))
    .await?;
  print_json(&request)
}

pub async fn vendor_list(client: &ApiClient, session: &Session) -> Result<()> {
  require_admin(session)?;
  print_json(&client.list_accreditations().await?)
}

pub async fn vendor_delete(client: &ApiClient, session: &Session, id: &str) -> Result<()> {
  require_admin(session)?;
  client.delete_accreditation(id).await?;
  print_json(&json!({ "deleted": id }))
}

#[cfg(test)]
mod tests {
  use pulga_core::user::NormalizedUser;

  use super::*;

  fn session_with_roles(roles: &[&str]) -> Session {
    let user = NormalizedUser {
      roles: roles.iter().map(|r| r.to_string()).collect(),
      ..NormalizedUser::default()
    };
    Session::logged_in(Some("tok".into()), Some(user), None)
  }

  #[test]
  fn admin_gate() {
    assert!(require_admin(&Session::default()).is_err());
    assert!(require_admin(&session_with_roles(&["cliente"])).is_err());
    assert!(require_admin(&session_with_roles(&["cliente", "admin"])).is_ok());
  }

  #[test]
  fn login_gate() {
    assert!(require_login(&Session::default()).is_err());
    assert!(require_login(&session_with_roles(&[])).is_ok());
  }

  #[test]
  fn profile_update_body_checks_confirmation_before_sending() {
    let mismatched = ProfileForm {
      password: "secreto".into(),
      repeat: "secretx".into(),
      ..ProfileForm::default()
    };
    let err = profile_update_body(&mismatched).unwrap_err();
    assert!(err.to_string().contains("passwords do not match"));

    assert!(profile_update_body(&ProfileForm::default()).is_err());

    let form = ProfileForm {
      email: Some("Ana@Demo.cl".into()),
      phone: Some("+56 9 1234 5678".into()),
      password: "secreto".into(),
      repeat: "secreto".into(),
      ..ProfileForm::default()
    };
    let body = profile_update_body(&form).unwrap();
    assert_eq!(body["email"], "ana@demo.cl");
    assert_eq!(body["password"], "secreto");
    assert!(!body.contains_key("name"));
  }

  #[test]
  fn rut_report_separates_shape_from_check_digit() {
    let good = rut_report("12.345.678-5");
    assert_eq!(good["canonical"], "12345678-5");
    assert_eq!(good["formatted"], "12.345.678-5");
    assert_eq!(good["formatValid"], true);
    assert_eq!(good["checkDigitValid"], true);

    let wrong_digit = rut_report("12.345.678-9");
    assert_eq!(wrong_digit["formatValid"], true);
    assert_eq!(wrong_digit["checkDigitValid"], false);

    let garbage = rut_report("1234-5");
    assert_eq!(garbage["formatValid"], false);
    assert!(garbage["checkDigitValid"].is_null());
  }

  #[test]
  fn normalize_each_kind() {
    let user = normalize(NormalizeKind::User, r#"{ "_id": "7", "roles": ["Usuario"] }"#)
      .unwrap();
    assert_eq!(user["id"], "7");
    assert_eq!(user["roles"], json!(["cliente"]));

    let users = normalize(NormalizeKind::Users, r#"[{}, {}]"#).unwrap();
    assert_eq!(users.as_array().map(Vec::len), Some(2));

    let roles = normalize(
      NormalizeKind::Roles,
      r#"[{ "slug": "admin", "displayName": "Admin" }, { "slug": "" }]"#,
    )
    .unwrap();
    assert_eq!(roles, json!([{ "id": "admin", "value": "admin", "label": "Admin" }]));

    let auth = normalize(NormalizeKind::Auth, r#"{ "user": { "roles": ["USER"] } }"#).unwrap();
    assert_eq!(auth["user"]["roles"], json!(["cliente"]));

    assert!(normalize(NormalizeKind::User, "{").is_err());
  }

  #[test]
  fn roles_view_lists_labels_for_assignable_roles() {
    let view = roles_view(&RoleRecord::fallback_catalog());
    let assignable = view["assignable"].as_array().unwrap();
    assert_eq!(assignable[0], json!({ "value": "admin", "label": "Administrador" }));
    assert!(assignable.iter().all(|r| r["value"] != "usuario"));
  }
}
