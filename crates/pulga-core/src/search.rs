//! Free-text filtering of the admin user table.

use crate::{rut, user::NormalizedUser};

/// Whether `user` matches the admin search box `query`.
///
/// A blank query matches everyone. Otherwise the lowercased query is looked
/// for in the id, email, raw and formatted RUT, name, last name and full
/// name. As a last resort the query and the RUT are compared with `.`, `-`,
/// `_` and whitespace removed, so `12345678` finds `12.345.678-9`.
pub fn user_matches(user: &NormalizedUser, query: &str) -> bool {
  let query = query.trim().to_lowercase();
  if query.is_empty() {
    return true;
  }

  let formatted_rut = user.formatted_rut();
  let full_name = format!("{} {}", user.name, user.last_name);
  let candidates = [
    user.id.as_str(),
    user.email.as_str(),
    user.rut.as_str(),
    formatted_rut.as_str(),
    user.name.as_str(),
    user.last_name.as_str(),
    full_name.as_str(),
  ];

  if candidates
    .iter()
    .filter(|c| !c.is_empty())
    .any(|c| c.to_lowercase().contains(&query))
  {
    return true;
  }

  rut::rut_search_key(&user.rut).contains(&rut::rut_search_key(&query))
}

/// The subset of `users` matching `query`, in their original order.
pub fn filter_users<'a>(
  users: &'a [NormalizedUser],
  query: &str,
) -> Vec<&'a NormalizedUser> {
  users.iter().filter(|u| user_matches(u, query)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn users() -> Vec<NormalizedUser> {
    vec![
      NormalizedUser {
        id: "1".into(),
        name: "Admin".into(),
        last_name: "Demo".into(),
        email: "admin@demo.local".into(),
        rut: "12345678-9".into(),
        roles: vec!["admin".into()],
        ..NormalizedUser::default()
      },
      NormalizedUser {
        id: "2".into(),
        name: "Vendedora".into(),
        last_name: "Prueba".into(),
        email: "vendedora@demo.local".into(),
        rut: "9876543-2".into(),
        roles: vec!["vendedor".into()],
        ..NormalizedUser::default()
      },
    ]
  }

  #[test]
  fn blank_query_matches_everyone() {
    assert_eq!(filter_users(&users(), "   ").len(), 2);
  }

  #[test]
  fn matches_full_name_case_insensitively() {
    let all = users();
    let found = filter_users(&all, "vendedora PRUEBA");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "2");
  }

  #[test]
  fn matches_formatted_rut() {
    let all = users();
    let found = filter_users(&all, "12.345.678");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "1");
  }

  #[test]
  fn matches_rut_without_separators() {
    let all = users();
    assert_eq!(filter_users(&all, "98765432")[0].id, "2");
    assert_eq!(filter_users(&all, "876 543-2")[0].id, "2");
  }

  #[test]
  fn unmatched_query_returns_nothing() {
    assert!(filter_users(&users(), "zzz").is_empty());
  }
}
