//! Async HTTP client wrapping the PulgaShop JSON API.
//!
//! Responses come back as raw JSON and go through `pulga-wire` before anything
//! else sees them.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use pulga_core::{
  role::RoleRecord,
  user::{NormalizedUser, VendorAccreditationRequest},
};
use pulga_wire::payload::sanitise_user_payload;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::{Map, Value};

/// Connection settings for the PulgaShop API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token from the stored session, if logged in.
  pub token:    Option<String>,
}

/// Async HTTP client for the PulgaShop REST API.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send `req` and decode the JSON body. An empty body is `null`.
  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Value> {
    let resp = req
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let status = resp.status();
    let body = resp
      .text()
      .await
      .with_context(|| format!("reading {what} response"))?;
    tracing::debug!(%status, what, "response received");

    if !status.is_success() {
      return Err(anyhow!("{what} → {status}{}", server_message(&body)));
    }
    if body.trim().is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_str(&body).with_context(|| format!("decoding {what} response"))
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /auth/login`. Returns the raw auth response.
  pub async fn login(&self, body: &Value) -> Result<Value> {
    let req = self.request(Method::POST, "/auth/login").json(body);
    self.send(req, "POST /auth/login").await
  }

  /// `POST /auth/register`. Returns the raw auth response.
  pub async fn register(&self, body: &Value) -> Result<Value> {
    let req = self.request(Method::POST, "/auth/register").json(body);
    self.send(req, "POST /auth/register").await
  }

  /// `POST /auth/forgot-password`
  pub async fn forgot_password(&self, body: &Value) -> Result<Value> {
    let req = self.request(Method::POST, "/auth/forgot-password").json(body);
    self.send(req, "POST /auth/forgot-password").await
  }

  /// `GET /auth/me`
  pub async fn me(&self) -> Result<NormalizedUser> {
    let req = self.request(Method::GET, "/auth/me");
    let body = self.send(req, "GET /auth/me").await?;
    Ok(pulga_wire::map_user_record(&body))
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `GET /users`
  pub async fn list_users(&self) -> Result<Vec<NormalizedUser>> {
    let req = self.request(Method::GET, "/users");
    let body = self.send(req, "GET /users").await?;
    Ok(pulga_wire::map_users(&body))
  }

  /// `POST /users`
  pub async fn create_user(&self, payload: Map<String, Value>) -> Result<NormalizedUser> {
    let payload = sanitise_user_payload(payload);
    let req = self.request(Method::POST, "/users").json(&payload);
    let body = self.send(req, "POST /users").await?;
    Ok(pulga_wire::map_user_record(&body))
  }

  /// `PATCH /users/{id}`, retried as `PUT` when the server does not route
  /// `PATCH` (404 or 405).
  pub async fn update_user(
    &self,
    id: &str,
    payload: Map<String, Value>,
  ) -> Result<NormalizedUser> {
    let payload = sanitise_user_payload(payload);
    let path = format!("/users/{id}");

    let resp = self
      .request(Method::PATCH, &path)
      .json(&payload)
      .send()
      .await
      .with_context(|| format!("PATCH {path} failed"))?;

    let body = if needs_put_fallback(resp.status()) {
      tracing::info!(status = %resp.status(), %path, "PATCH not routed; retrying as PUT");
      let req = self.request(Method::PUT, &path).json(&payload);
      self.send(req, &format!("PUT {path}")).await?
    } else {
      let status = resp.status();
      let text = resp.text().await.context("reading PATCH response")?;
      if !status.is_success() {
        return Err(anyhow!("PATCH {path} → {status}{}", server_message(&text)));
      }
      if text.trim().is_empty() {
        Value::Null
      } else {
        serde_json::from_str(&text).context("decoding PATCH response")?
      }
    };
    Ok(pulga_wire::map_user_record(&body))
  }

  /// `DELETE /users/{id}`
  pub async fn delete_user(&self, id: &str) -> Result<()> {
    let path = format!("/users/{id}");
    let req = self.request(Method::DELETE, &path);
    self.send(req, &format!("DELETE {path}")).await?;
    Ok(())
  }

  // ── Roles ─────────────────────────────────────────────────────────────────

  /// `GET /roles`
  pub async fn roles(&self) -> Result<Vec<RoleRecord>> {
    let req = self.request(Method::GET, "/roles");
    let body = self.send(req, "GET /roles").await?;
    Ok(pulga_wire::map_role_catalog(&body))
  }

  // ── Vendor accreditation ──────────────────────────────────────────────────

  /// `POST /vendor-accreditations`
  pub async fn request_accreditation(
    &self,
    body: &Value,
  ) -> Result<VendorAccreditationRequest> {
    let req = self
      .request(Method::POST, "/vendor-accreditations")
      .json(body);
    let body = self.send(req, "POST /vendor-accreditations").await?;
    Ok(pulga_wire::map_accreditation_request(&body))
  }

  /// `GET /vendor-accreditations`
  pub async fn list_accreditations(&self) -> Result<Vec<VendorAccreditationRequest>> {
    let req = self.request(Method::GET, "/vendor-accreditations");
    let body = self.send(req, "GET /vendor-accreditations").await?;
    Ok(pulga_wire::map_accreditation_requests(&body))
  }

  /// `DELETE /vendor-accreditations/{id}`
  pub async fn delete_accreditation(&self, id: &str) -> Result<()> {
    let path = format!("/vendor-accreditations/{id}");
    let req = self.request(Method::DELETE, &path);
    self.send(req, &format!("DELETE {path}")).await?;
    Ok(())
  }
}

fn needs_put_fallback(status: StatusCode) -> bool {
  matches!(status, StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED)
}

/// `": <message>"` from an error body shaped `{ "message": ... }`, else `""`.
fn server_message(body: &str) -> String {
  let Ok(value) = serde_json::from_str::<Value>(body) else {
    return String::new();
  };
  match value.get("message") {
    Some(Value::String(msg)) if !msg.is_empty() => format!(": {msg}"),
    Some(Value::Array(msgs)) => {
      let msgs: Vec<&str> = msgs.iter().filter_map(Value::as_str).collect();
      if msgs.is_empty() {
        String::new()
      } else {
        format!(": {}", msgs.join("; "))
      }
    }
    _ => String::new(),
  }
}
