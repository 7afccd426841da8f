use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ProvisionError, ProvisionResult};

static DISALLOWED_RE: OnceLock<Regex> = OnceLock::new();

/// Turn a user supplied identifier into a site name usable as a directory,
/// a Valet host label and part of a database name.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a single
/// `-` and trims dashes from both ends. Applying it twice gives the same result.
pub fn sanitize_site_name(input: &str) -> ProvisionResult<String> {
  let re = DISALLOWED_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
  let lowered = input.to_lowercase();
  let replaced = re.replace_all(&lowered, "-");
  let trimmed = replaced.trim_matches('-');
  if trimmed.is_empty() {
    return Err(ProvisionError::InvalidSiteName(input.to_string()));
  }
  Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
  use super::sanitize_site_name;
  use crate::error::ProvisionError;

  #[test]
  fn keeps_plain_names() {
    assert_eq!(sanitize_site_name("example").unwrap(), "example");
    assert_eq!(sanitize_site_name("site2").unwrap(), "site2");
  }

  #[test]
  fn normalizes_separators_and_case() {
    assert_eq!(sanitize_site_name("My Site").unwrap(), "my-site");
    assert_eq!(sanitize_site_name("my_cool.site").unwrap(), "my-cool-site");
    assert_eq!(sanitize_site_name("--a!!b--").unwrap(), "a-b");
  }

  #[test]
  fn strips_non_ascii() {
    assert_eq!(sanitize_site_name("märchen").unwrap(), "m-rchen");
  }

  #[test]
  fn only_allowed_characters_remain_and_is_idempotent() {
    for input in [
      "Hello World",
      "a/b\\c",
      "  spaced  ",
      "x@y#z",
      "ümlaut-ß",
      "already-fine",
      "123",
      "a--b",
    ] {
      let once = sanitize_site_name(input).unwrap();
      assert!(
        once
          .chars()
          .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
        "{input:?} -> {once:?}"
      );
      assert!(!once.starts_with('-') && !once.ends_with('-'));
      assert_eq!(sanitize_site_name(&once).unwrap(), once);
    }
  }

  #[test]
  fn rejects_names_without_allowed_characters() {
    assert!(sanitize_site_name("").is_err());
    assert!(sanitize_site_name("!!!").is_err());
    assert!(matches!(
      sanitize_site_name("ßß"),
      Err(ProvisionError::InvalidSiteName(raw)) if raw == "ßß"
    ));
  }
}
