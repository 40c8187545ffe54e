//! Form-level input validation.
//!
//! Each form checks its rules in a fixed order and reports the first one that
//! fails. The `Display` text of [`ValidationError`] is meant to be shown to
//! the user as-is.

use thiserror::Error;

use crate::rut::{is_rut_format_valid, is_rut_hyphenated};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("all required fields must be filled in")]
  MissingFields,

  #[error("name is required")]
  NameRequired,

  #[error("last name is required")]
  LastNameRequired,

  #[error("email is required")]
  EmailRequired,

  #[error("invalid email format")]
  InvalidEmail,

  #[error("select at least one role")]
  RoleRequired,

  #[error("RUT must look like 12.345.678-9")]
  InvalidRut,

  #[error("password must be at least {} characters", MIN_PASSWORD_LEN)]
  PasswordTooShort,

  #[error("passwords do not match")]
  PasswordMismatch,

  #[error("the terms of service must be accepted")]
  TermsNotAccepted,

  #[error("nothing to update")]
  NothingToUpdate,
}

/// `local@domain.tld`: no whitespace, exactly one `@`, a non-empty local
/// part and a domain with a dot that has text on both sides.
pub fn is_email_shaped(s: &str) -> bool {
  if s.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain
      .char_indices()
      .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn password_long_enough(password: &str) -> bool {
  password.chars().count() >= MIN_PASSWORD_LEN
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
  pub email:    String,
  pub password: String,
}

impl LoginForm {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.email.trim().is_empty() || self.password.is_empty() {
      return Err(ValidationError::MissingFields);
    }
    if !is_email_shaped(self.email.trim()) {
      return Err(ValidationError::InvalidEmail);
    }
    if !password_long_enough(&self.password) {
      return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
  pub rut:            String,
  pub name:           String,
  pub last_name:      String,
  pub email:          String,
  pub password:       String,
  pub repeat:         String,
  pub terms_accepted: bool,
}

impl RegisterForm {
  pub fn validate(&self) -> Result<(), ValidationError> {
    let required = [
      self.rut.trim(),
      self.name.trim(),
      self.last_name.trim(),
      self.email.trim(),
      self.password.as_str(),
      self.repeat.as_str(),
    ];
    if required.iter().any(|s| s.is_empty()) {
      return Err(ValidationError::MissingFields);
    }
    if !is_rut_hyphenated(&self.rut) {
      return Err(ValidationError::InvalidRut);
    }
    if !is_email_shaped(&self.email.trim().to_lowercase()) {
      return Err(ValidationError::InvalidEmail);
    }
    if !password_long_enough(&self.password) {
      return Err(ValidationError::PasswordTooShort);
    }
    if self.password != self.repeat {
      return Err(ValidationError::PasswordMismatch);
    }
    if !self.terms_accepted {
      return Err(ValidationError::TermsNotAccepted);
    }
    Ok(())
  }
}

// ─── Admin user form ─────────────────────────────────────────────────────────

/// The admin console's create/edit user dialog.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
  /// `None` when creating a new user.
  pub id:        Option<String>,
  pub name:      String,
  pub last_name: String,
  pub email:     String,
  /// As typed; may be blank.
  pub rut:       String,
  pub roles:     Vec<String>,
  /// Blank when editing means "keep the current password".
  pub password:  String,
}

impl UserForm {
  pub fn is_new(&self) -> bool {
    self.id.as_deref().is_none_or(|id| id.trim().is_empty())
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.name.trim().is_empty() {
      return Err(ValidationError::NameRequired);
    }
    if self.last_name.trim().is_empty() {
      return Err(ValidationError::LastNameRequired);
    }
    let email = self.email.trim().to_lowercase();
    if email.is_empty() {
      return Err(ValidationError::EmailRequired);
    }
    if !is_email_shaped(&email) {
      return Err(ValidationError::InvalidEmail);
    }
    if self.roles.is_empty() {
      return Err(ValidationError::RoleRequired);
    }
    let rut = self.rut.trim();
    if !rut.is_empty() && !is_rut_format_valid(rut) {
      return Err(ValidationError::InvalidRut);
    }
    let password = self.password.trim();
    let password_required = self.is_new() || !password.is_empty();
    if password_required && !password_long_enough(password) {
      return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
  }
}

// ─── Own profile ─────────────────────────────────────────────────────────────

/// A logged-in user's edit of their own account and profile.
///
/// Every field is optional; `None` leaves the stored value alone. A password
/// is only changed when one is typed, and it must match `repeat`.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
  pub name:      Option<String>,
  pub last_name: Option<String>,
  pub email:     Option<String>,
  pub phone:     Option<String>,
  pub bio:       Option<String>,
  pub photo:     Option<String>,
  pub password:  String,
  pub repeat:    String,
}

impl ProfileForm {
  pub fn changes_password(&self) -> bool { !self.password.is_empty() }

  pub fn validate(&self) -> Result<(), ValidationError> {
    let fields = [
      &self.name,
      &self.last_name,
      &self.email,
      &self.phone,
      &self.bio,
      &self.photo,
    ];
    if fields.iter().all(|f| f.is_none()) && !self.changes_password() {
      return Err(ValidationError::NothingToUpdate);
    }
    if let Some(name) = &self.name
      && name.trim().is_empty()
    {
      return Err(ValidationError::NameRequired);
    }
    if let Some(last_name) = &self.last_name
      && last_name.trim().is_empty()
    {
      return Err(ValidationError::LastNameRequired);
    }
    if let Some(email) = &self.email
      && !is_email_shaped(&email.trim().to_lowercase())
    {
      return Err(ValidationError::InvalidEmail);
    }
    if self.changes_password() {
      if self.password != self.repeat {
        return Err(ValidationError::PasswordMismatch);
      }
      if !password_long_enough(self.password.trim()) {
        return Err(ValidationError::PasswordTooShort);
      }
    }
    Ok(())
  }
}

// ─── Vendor accreditation ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AccreditationForm {
  pub store_name:     String,
  pub contact_number: String,
  pub company_rut:    String,
}

impl AccreditationForm {
  pub fn validate(&self) -> Result<(), ValidationError> {
    let required = [
      self.store_name.trim(),
      self.contact_number.trim(),
      self.company_rut.trim(),
    ];
    if required.iter().any(|s| s.is_empty()) {
      return Err(ValidationError::MissingFields);
    }
    if !is_rut_format_valid(self.company_rut.trim()) {
      return Err(ValidationError::InvalidRut);
    }
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
