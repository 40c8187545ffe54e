//! The locally cached session and the store abstraction that holds it.
//!
//! Nothing else in this crate touches storage. Whatever layer needs the
//! session is handed a [`SessionStore`]; the CLI backs it with a JSON file,
//! tests and embedders use [`MemorySessionStore`].

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, redirect, user::NormalizedUser};

// ─── Session ─────────────────────────────────────────────────────────────────

/// What the client remembers between runs. Serializes with the camelCase
/// keys the web client kept in local storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub token:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user:         Option<NormalizedUser>,
  pub is_logged_in: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub redirect_to:  Option<String>,
}

impl Session {
  /// A logged-in session. The redirect target is resolved once, here, from
  /// the server's hint and the user's roles.
  pub fn logged_in(
    token: Option<String>,
    user: Option<NormalizedUser>,
    redirect_hint: Option<&str>,
  ) -> Self {
    let roles = user.as_ref().map(|u| u.roles.as_slice()).unwrap_or(&[]);
    let redirect_to = redirect::resolve_post_auth_redirect(redirect_hint, roles);
    Self {
      is_logged_in: token.is_some(),
      token,
      user,
      redirect_to: Some(redirect_to),
    }
  }

  /// The token to send as `Authorization: Bearer …`, if any.
  pub fn bearer_token(&self) -> Option<&str> {
    self.token.as_deref().filter(|t| !t.is_empty())
  }

  pub fn is_admin(&self) -> bool {
    self.user.as_ref().is_some_and(NormalizedUser::is_admin)
  }

  /// Where a logged-in user should be taken when opening an auth page.
  /// `None` when not logged in.
  pub fn landing_route(&self) -> Option<String> {
    if !self.is_logged_in {
      return None;
    }
    let roles = self.user.as_ref().map(|u| u.roles.as_slice()).unwrap_or(&[]);
    Some(redirect::resolve_post_auth_redirect(
      self.redirect_to.as_deref(),
      roles,
    ))
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn from_json(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }
}

// ─── Store trait ─────────────────────────────────────────────────────────────

/// Injected access to the persisted session.
///
/// `get` on an empty store returns [`Session::default`] rather than an error.
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get(&self) -> Result<Session, Self::Error>;

  fn set(&self, session: &Session) -> Result<(), Self::Error>;

  fn clear(&self) -> Result<(), Self::Error>;
}

// ─── In-memory store ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemorySessionStore {
  inner: RwLock<Session>,
}

impl MemorySessionStore {
  pub fn new(session: Session) -> Self {
    Self {
      inner: RwLock::new(session),
    }
  }
}

impl SessionStore for MemorySessionStore {
  type Error = Error;

  fn get(&self) -> Result<Session> {
    self
      .inner
      .read()
      .map(|s| s.clone())
      .map_err(|e| Error::SessionStore(e.to_string()))
  }

  fn set(&self, session: &Session) -> Result<()> {
    let mut guard = self
      .inner
      .write()
      .map_err(|e| Error::SessionStore(e.to_string()))?;
    *guard = session.clone();
    Ok(())
  }

  fn clear(&self) -> Result<()> { self.set(&Session::default()) }
}
