//! Chilean RUT (national identification number) helpers.
//!
//! A RUT is a 7–8 digit body plus a check character (`0`–`9` or `K`),
//! conventionally written `12.345.678-9`. Three spellings matter here:
//!
//! - **raw**: whatever the user typed or the API returned;
//! - **canonical**: `12345678-9` (digits only, hyphen, uppercase check);
//! - **display**: `12.345.678-9` (body grouped by thousands).
//!
//! The free functions are total over `&str`. Degenerate input yields `""` or
//! `false`, never an error, so forms can validate on every keystroke. Strict
//! parsing lives on [`Rut`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const MIN_BODY_LEN: usize = 7;
const MAX_BODY_LEN: usize = 8;

/// Modulo-11 weights, applied right to left and repeated as needed.
const CHECK_WEIGHTS: [u32; 6] = [2, 3, 4, 5, 6, 7];

// ─── Low-level helpers ───────────────────────────────────────────────────────

/// Drop the separators a RUT may carry for display: dots and whitespace.
fn clean(raw: &str) -> String {
  raw
    .chars()
    .filter(|c| *c != '.' && !c.is_whitespace())
    .collect()
}

/// Split a cleaned RUT into `(body, check)`.
///
/// The check part follows the last hyphen. Without a hyphen it is the final
/// character.
fn split(cleaned: &str) -> (&str, &str) {
  match cleaned.rfind('-') {
    Some(pos) => (&cleaned[..pos], &cleaned[pos + 1..]),
    None => match cleaned.char_indices().last() {
      Some((pos, _)) => (&cleaned[..pos], &cleaned[pos..]),
      None => ("", ""),
    },
  }
}

fn is_check_char(s: &str) -> bool {
  matches!(s.as_bytes(), [b'0'..=b'9' | b'k' | b'K'])
}

/// Insert a dot every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
  let len = digits.chars().count();
  let mut out = String::with_capacity(len + len / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (len - i) % 3 == 0 {
      out.push('.');
    }
    out.push(c);
  }
  out
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Keep only digits, hyphens and `K` (lowercase `k` is uppercased).
///
/// Intended for echoing back into a text field while the user types.
pub fn sanitise_rut_input(raw: &str) -> String {
  raw
    .chars()
    .filter_map(|c| match c {
      '0'..='9' | '-' | 'K' => Some(c),
      'k' => Some('K'),
      _ => None,
    })
    .collect()
}

/// Canonicalise the shape of a RUT without validating it.
///
/// Dots and whitespace are removed, the body keeps only its digits and the
/// check part is uppercased: `"12.345.678-k"` → `"12345678-K"`. Input without
/// a hyphen treats its last character as the check character. Returns `""`
/// when nothing is left after cleaning, and just the check part when the body
/// has no digits.
pub fn normalise_rut(raw: &str) -> String {
  let cleaned = clean(raw);
  if cleaned.is_empty() {
    return String::new();
  }

  let (body, check) = split(&cleaned);
  let digits: String = body.chars().filter(char::is_ascii_digit).collect();
  let check = check.to_uppercase();

  if digits.is_empty() {
    return check;
  }
  format!("{digits}-{check}")
}

/// Shape-only validation: a 7–8 digit body and a single `0`–`9`/`K` check
/// character, after removing dots and whitespace.
///
/// The check character is *not* verified against the body. Use
/// [`Rut::has_valid_check_char`] for the modulo-11 test.
pub fn is_rut_format_valid(raw: &str) -> bool {
  let cleaned = clean(raw);
  let (body, check) = split(&cleaned);
  (MIN_BODY_LEN..=MAX_BODY_LEN).contains(&body.len())
    && body.bytes().all(|b| b.is_ascii_digit())
    && is_check_char(check)
}

/// Like [`is_rut_format_valid`], but the hyphen before the check character is
/// mandatory and only dots (plus surrounding whitespace) are tolerated:
/// `12.345.678-9` and `12345678-k` pass, `123456789` does not.
pub fn is_rut_hyphenated(raw: &str) -> bool {
  let cleaned: String = raw.trim().chars().filter(|c| *c != '.').collect();
  let Some((body, check)) = cleaned.split_once('-') else {
    return false;
  };
  (MIN_BODY_LEN..=MAX_BODY_LEN).contains(&body.len())
    && body.bytes().all(|b| b.is_ascii_digit())
    && is_check_char(check)
}

/// Render a RUT in display form, e.g. `"123456789"` → `"12.345.678-9"`.
///
/// Returns `""` when the input has no digits to group. Idempotent.
pub fn format_rut(raw: &str) -> String {
  let canonical = normalise_rut(raw);
  match canonical.rsplit_once('-') {
    Some((body, check)) if !body.is_empty() => {
      format!("{}-{check}", group_thousands(body))
    }
    _ => String::new(),
  }
}

/// Lowercase `s` and drop `.`, `-`, `_` and whitespace, so that RUTs typed
/// with or without separators compare equal as substrings.
pub fn rut_search_key(s: &str) -> String {
  s.chars()
    .filter(|c| !matches!(c, '.' | '-' | '_') && !c.is_whitespace())
    .flat_map(char::to_lowercase)
    .collect()
}

/// Compute the modulo-11 check character for an all-digit `body`.
///
/// Returns `None` if `body` is empty or contains anything but ASCII digits.
pub fn expected_check_char(body: &str) -> Option<char> {
  if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  let sum: u32 = body
    .bytes()
    .rev()
    .zip(CHECK_WEIGHTS.iter().cycle())
    .map(|(b, w)| u32::from(b - b'0') * w)
    .sum();
  match 11 - sum % 11 {
    11 => Some('0'),
    10 => Some('K'),
    d => char::from_digit(d, 10),
  }
}

// ─── Rut ─────────────────────────────────────────────────────────────────────

/// A format-valid RUT, stored in canonical form.
///
/// Serializes as the canonical string; `Display` renders the dotted form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rut {
  canonical: String,
}

impl Rut {
  /// `12345678-9`
  pub fn canonical(&self) -> &str { &self.canonical }

  /// `12.345.678-9`
  pub fn formatted(&self) -> String { format_rut(&self.canonical) }

  /// The digits before the hyphen.
  pub fn body(&self) -> &str {
    self
      .canonical
      .rsplit_once('-')
      .map(|(body, _)| body)
      .unwrap_or_default()
  }

  /// The uppercase check character.
  pub fn check_char(&self) -> char {
    self.canonical.chars().last().unwrap_or('0')
  }

  /// Whether the check character matches the modulo-11 digit of the body.
  pub fn has_valid_check_char(&self) -> bool {
    expected_check_char(self.body()) == Some(self.check_char())
  }
}

impl FromStr for Rut {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    if !is_rut_format_valid(s) {
      return Err(Error::InvalidRut(s.to_string()));
    }
    Ok(Self {
      canonical: normalise_rut(s),
    })
  }
}

impl TryFrom<String> for Rut {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { value.parse() }
}

impl From<Rut> for String {
  fn from(rut: Rut) -> Self { rut.canonical }
}

impl fmt::Display for Rut {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.formatted())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  /// Typed, partial, dotted, lowercase-k and garbage inputs.
  const CORPUS: &[&str] = &[
    "",
    " ",
    "-",
    "k",
    "5",
    "12.345.678-9",
    "12345678-9",
    "123456789",
    "12.345.678-k",
    "9.876.543-2",
    "  7 654 321 - 0 ",
    "1234-5",
    "12345678-",
    "12-345-678-9",
    "abc",
    "ab-cd",
    "rut: 11.111.111-1",
    "12.3a45.678-9x",
    "ñandú-ß",
    "0001234567-8",
  ];

  // ── sanitise_rut_input ────────────────────────────────────────────────────

  #[test]
  fn sanitise_keeps_only_rut_characters() {
    for s in CORPUS {
      let out = sanitise_rut_input(s);
      assert!(
        out.chars().all(|c| c.is_ascii_digit() || c == '-' || c == 'K'),
        "{s:?} → {out:?}"
      );
    }
  }

  #[test]
  fn sanitise_output_is_subsequence_of_uppercased_input() {
    for s in CORPUS {
      let out = sanitise_rut_input(s);
      let upper = s.to_uppercase();
      let mut rest = upper.chars();
      for c in out.chars() {
        assert!(rest.any(|u| u == c), "{out:?} is not a subsequence of {upper:?}");
      }
    }
  }

  #[test]
  fn sanitise_strips_dots_and_uppercases_k() {
    assert_eq!(sanitise_rut_input("12.345.678-k"), "12345678-K");
    assert_eq!(sanitise_rut_input("abc"), "");
  }

  // ── normalise_rut ─────────────────────────────────────────────────────────

  #[test]
  fn normalise_dotted_form() {
    assert_eq!(normalise_rut("12.345.678-9"), "12345678-9");
    assert_eq!(normalise_rut("9.876.543-2"), "9876543-2");
  }

  #[test]
  fn normalise_without_hyphen_uses_last_char_as_check() {
    assert_eq!(normalise_rut("123456789"), "12345678-9");
    assert_eq!(normalise_rut("12345678k"), "12345678-K");
  }

  #[test]
  fn normalise_uppercases_check_and_drops_whitespace() {
    assert_eq!(normalise_rut(" 12 345 678 - k "), "12345678-K");
  }

  #[test]
  fn normalise_splits_on_last_hyphen() {
    assert_eq!(normalise_rut("12-345-678-9"), "12345678-9");
  }

  #[test]
  fn normalise_keeps_leading_zeros() {
    assert_eq!(normalise_rut("01.234.567-8"), "01234567-8");
  }

  #[test]
  fn normalise_empty_input() {
    assert_eq!(normalise_rut(""), "");
    assert_eq!(normalise_rut(" . . "), "");
    assert_eq!(normalise_rut("-"), "");
  }

  #[test]
  fn normalise_partial_input_does_not_fail() {
    assert_eq!(normalise_rut("12345678-"), "12345678-");
    assert_eq!(normalise_rut("k"), "K");
  }

  // ── is_rut_format_valid ───────────────────────────────────────────────────

  #[test]
  fn format_validity_examples() {
    assert!(is_rut_format_valid("12.345.678-9"));
    assert!(is_rut_format_valid("12345678-9"));
    assert!(is_rut_format_valid("9.876.543-k"));
    assert!(is_rut_format_valid("123456789"));
    assert!(!is_rut_format_valid("1234-5"));
    assert!(!is_rut_format_valid(""));
  }

  #[test]
  fn format_validity_rejects_bad_shapes() {
    assert!(!is_rut_format_valid("123456789-0"), "body too long");
    assert!(!is_rut_format_valid("12345678-99"), "two check chars");
    assert!(!is_rut_format_valid("12345678-X"), "bad check char");
    assert!(!is_rut_format_valid("12a45678-9"), "letter in body");
    assert!(!is_rut_format_valid("12345678-"), "missing check");
  }

  #[test]
  fn hyphenated_form_requires_the_hyphen() {
    assert!(is_rut_hyphenated("12.345.678-9"));
    assert!(is_rut_hyphenated(" 12345678-k "));
    assert!(is_rut_hyphenated("9876543-3"));
    assert!(!is_rut_hyphenated("123456789"));
    assert!(!is_rut_hyphenated("12 345 678-9"), "only dots are tolerated");
    assert!(!is_rut_hyphenated("1234-5"));
    assert!(!is_rut_hyphenated("12345678-99"));
    assert!(!is_rut_hyphenated(""));
  }

  #[test]
  fn format_validity_ignores_checksum() {
    // 12.345.678 has check digit 5; 9 is accepted on shape alone.
    assert!(is_rut_format_valid("12.345.678-9"));
    assert!(!"12.345.678-9".parse::<Rut>().unwrap().has_valid_check_char());
  }

  // ── format_rut ────────────────────────────────────────────────────────────

  #[test]
  fn format_groups_thousands() {
    assert_eq!(format_rut("12345678-9"), "12.345.678-9");
    assert_eq!(format_rut("9876543-2"), "9.876.543-2");
    assert_eq!(format_rut("123456789"), "12.345.678-9");
    assert_eq!(format_rut("1-9"), "1-9");
    assert_eq!(format_rut("1234-5"), "1.234-5");
  }

  #[test]
  fn format_degenerate_input_is_empty() {
    assert_eq!(format_rut(""), "");
    assert_eq!(format_rut("k"), "");
    assert_eq!(format_rut("abc"), "");
  }

  #[test]
  fn format_is_idempotent() {
    for s in CORPUS {
      let once = format_rut(s);
      assert_eq!(format_rut(&once), once, "input {s:?}");
    }
  }

  #[test]
  fn normalise_format_round_trip() {
    for s in CORPUS {
      let canonical = normalise_rut(s);
      if is_rut_format_valid(&canonical) {
        assert_eq!(normalise_rut(&format_rut(&canonical)), canonical);
      }
    }
  }

  // ── search key ────────────────────────────────────────────────────────────

  #[test]
  fn search_key_strips_separators() {
    assert_eq!(rut_search_key("12.345.678-K"), "12345678k");
    assert_eq!(rut_search_key("12_345 678"), "12345678");
  }

  // ── check character ───────────────────────────────────────────────────────

  #[test]
  fn expected_check_char_known_values() {
    assert_eq!(expected_check_char("12345678"), Some('5'));
    assert_eq!(expected_check_char("9876543"), Some('3'));
    assert_eq!(expected_check_char("11111111"), Some('1'));
    assert_eq!(expected_check_char(""), None);
    assert_eq!(expected_check_char("12a"), None);
  }

  #[test]
  fn expected_check_char_covers_k_and_zero() {
    // 10000013: weights give a remainder of 1 → K.
    assert_eq!(expected_check_char("10000013"), Some('K'));
    // 10000004: remainder 0 → 0.
    assert_eq!(expected_check_char("10000004"), Some('0'));
  }

  // ── Rut ───────────────────────────────────────────────────────────────────

  #[test]
  fn rut_parses_and_displays() {
    let rut: Rut = "12345678-5".parse().unwrap();
    assert_eq!(rut.canonical(), "12345678-5");
    assert_eq!(rut.to_string(), "12.345.678-5");
    assert_eq!(rut.body(), "12345678");
    assert_eq!(rut.check_char(), '5');
    assert!(rut.has_valid_check_char());
  }

  #[test]
  fn rut_rejects_invalid_format() {
    let err = "1234-5".parse::<Rut>().unwrap_err();
    assert!(matches!(err, Error::InvalidRut(s) if s == "1234-5"));
  }

  #[test]
  fn rut_serializes_as_canonical_string() {
    let rut: Rut = "12.345.678-k".parse().unwrap();
    assert_eq!(serde_json::to_string(&rut).unwrap(), "\"12345678-K\"");
    let back: Rut = serde_json::from_str("\"12.345.678-K\"").unwrap();
    assert_eq!(back, rut);
    assert!(serde_json::from_str::<Rut>("\"nope\"").is_err());
  }
}
