//! Pathname classification and discovery-link policy.
use globset::GlobBuilder;
use log::warn;

/// Result of classifying a pathname against the configured path identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
  /// Whether the page is an AMP variant.
  pub is_amp: bool,
}

/// Classify a pathname as AMP or canonical.
///
/// Classification is a pure substring test: a page is AMP exactly when its
/// pathname contains the identifier. An empty pathname is never AMP.
#[must_use]
pub fn classify(pathname: &str, path_identifier: &str) -> Classification {
  Classification {
    is_amp: !pathname.is_empty() && pathname.contains(path_identifier),
  }
}

/// Decide whether a canonical page should advertise its AMP counterpart via
/// a `<link rel="amphtml">` tag.
///
/// Precedence, evaluated in order:
///
/// 1. `excluded` is non-empty and the pathname matches none of it;
/// 2. `included` is non-empty and the pathname matches at least one entry;
/// 3. both lists are empty.
///
/// Patterns use shell-glob syntax where `*` does not cross path separators
/// and `**` does.
#[must_use]
pub fn should_emit_discovery_link(
  pathname: &str,
  included: &[String],
  excluded: &[String],
) -> bool {
  (!excluded.is_empty()
    && !pathname.is_empty()
    && !matches_any(pathname, excluded))
    || (!included.is_empty()
      && !pathname.is_empty()
      && matches_any(pathname, included))
    || (excluded.is_empty() && included.is_empty())
}

/// Whether the pathname matches any of the given glob patterns.
///
/// Invalid patterns are logged and treated as non-matching; configuration is
/// best effort.
fn matches_any(pathname: &str, patterns: &[String]) -> bool {
  patterns.iter().any(|pattern| {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
      Ok(glob) => glob.compile_matcher().is_match(pathname),
      Err(err) => {
        warn!("Ignoring invalid path pattern {pattern:?}: {err}");
        false
      },
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classification_is_a_substring_test() {
    assert!(classify("/articles/amp/hello", "/amp/").is_amp);
    assert!(!classify("/articles/hello", "/amp/").is_amp);
    assert!(classify("/mobile/x", "/mobile/").is_amp);
  }

  #[test]
  fn empty_pathname_is_never_amp() {
    assert!(!classify("", "/amp/").is_amp);
    assert!(!classify("", "").is_amp);
  }

  #[test]
  fn excluded_pattern_anchored_at_root_only_matches_from_root() {
    let excluded = vec!["/foo/**".to_string()];
    // Matches the excluded pattern: no discovery link.
    assert!(!should_emit_discovery_link("/foo/bar", &[], &excluded));
    // The pattern is anchored at the root, so this path is not excluded.
    assert!(should_emit_discovery_link("/baz/foo/bar", &[], &excluded));
  }

  #[test]
  fn recursive_excluded_pattern_matches_anywhere() {
    let excluded = vec!["**/foo/**".to_string()];
    assert!(!should_emit_discovery_link("/baz/foo/bar", &[], &excluded));
  }

  #[test]
  fn single_star_does_not_cross_separators() {
    let included = vec!["/articles/*".to_string()];
    assert!(should_emit_discovery_link("/articles/hello", &included, &[]));
    assert!(!should_emit_discovery_link(
      "/articles/2024/hello",
      &included,
      &[]
    ));
  }

  #[test]
  fn included_list_requires_a_match() {
    let included = vec!["/blog/**".to_string()];
    assert!(should_emit_discovery_link("/blog/post", &included, &[]));
    assert!(!should_emit_discovery_link("/about", &included, &[]));
  }

  #[test]
  fn branches_combine_with_or_when_both_lists_set() {
    let included = vec!["/news/**".to_string()];
    let excluded = vec!["/blog/**".to_string()];
    // Not excluded: the exclusion branch emits regardless of included.
    assert!(should_emit_discovery_link("/about", &included, &excluded));
    // Excluded and not included: no branch fires.
    assert!(!should_emit_discovery_link("/blog/post", &included, &excluded));
    // Excluded but also included: the inclusion branch still emits.
    assert!(should_emit_discovery_link(
      "/news/today",
      &included,
      &[
        "/news/**".to_string()
      ]
    ));
  }

  #[test]
  fn both_lists_empty_always_emits() {
    assert!(should_emit_discovery_link("/anything", &[], &[]));
  }

  #[test]
  fn invalid_pattern_is_ignored() {
    let excluded = vec!["[".to_string()];
    // The broken pattern matches nothing, so exclusion never fires.
    assert!(should_emit_discovery_link("/page", &[], &excluded));
  }
}
