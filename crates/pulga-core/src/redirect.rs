//! Where to send a user after they authenticate.

use crate::role;

pub const ADMIN_ROUTE: &str = "/admin";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// A non-blank `redirect_to` from the server wins; otherwise admins land on
/// [`ADMIN_ROUTE`] and everyone else on [`DASHBOARD_ROUTE`].
pub fn resolve_post_auth_redirect(
  redirect_to: Option<&str>,
  roles: &[String],
) -> String {
  match redirect_to {
    Some(target) if !target.trim().is_empty() => target.to_string(),
    _ if role::is_admin(roles) => ADMIN_ROUTE.to_string(),
    _ => DASHBOARD_ROUTE.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn roles(r: &[&str]) -> Vec<String> {
    r.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn explicit_target_wins() {
    assert_eq!(
      resolve_post_auth_redirect(Some("/vendedor"), &roles(&["admin"])),
      "/vendedor"
    );
  }

  #[test]
  fn blank_target_falls_back_to_role() {
    assert_eq!(
      resolve_post_auth_redirect(Some("  "), &roles(&["ADMIN"])),
      ADMIN_ROUTE
    );
    assert_eq!(
      resolve_post_auth_redirect(None, &roles(&["usuario"])),
      DASHBOARD_ROUTE
    );
    assert_eq!(resolve_post_auth_redirect(None, &[]), DASHBOARD_ROUTE);
  }
}
