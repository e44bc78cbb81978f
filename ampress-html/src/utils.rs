//! String utilities shared by head assembly: `{{token}}` interpolation and
//! URL slash collapsing.
use std::{collections::HashMap, sync::OnceLock};

use regex::{Captures, Regex};

fn token_regex() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("hard-coded regex is valid")
  })
}

fn doubled_slash_regex() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"([^:])/{2,}").expect("hard-coded regex is valid")
  })
}

/// Substitute `{{key}}` tokens in a template.
///
/// Unknown keys interpolate to the empty string; there is no error path.
#[must_use]
pub fn interpolate(template: &str, map: &HashMap<&str, &str>) -> String {
  token_regex()
    .replace_all(template, |caps: &Captures| {
      map.get(&caps[1]).copied().unwrap_or_default().to_string()
    })
    .into_owned()
}

/// Collapse runs of `/` down to a single slash, except after a `:` so that
/// scheme separators like `https://` survive.
#[must_use]
pub fn collapse_slashes(url: &str) -> String {
  doubled_slash_regex().replace_all(url, "${1}/").into_owned()
}

/// Remove every literal `!important` token; AMP forbids it in stylesheets.
#[must_use]
pub fn strip_important(css: &str) -> String {
  css.replace("!important", "")
}
