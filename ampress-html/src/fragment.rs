//! The markup fragment model shared between the host renderer and head
//! assembly.
//!
//! Fragments are opaque nodes: a tag name, an optional host-assigned key,
//! ordered attributes, children and optional raw inner HTML. Head assembly
//! never mutates a fragment; it only includes, excludes or replaces them in
//! new ordered sequences.

/// Key marking a fragment as the typography stylesheet. Its text is
/// prepended to the combined AMP custom stylesheet.
pub const TYPOGRAPHY_STYLE_KEY: &str = "typography-style";

/// Key marking a pre-body fragment as a tag-manager injection. Dropped on
/// AMP pages, which use `amp-analytics` instead.
pub const TAG_MANAGER_KEY: &str = "tag-manager";

/// A single head/pre-body/post-body markup fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
  /// Tag name, e.g. `style` or `script`.
  pub tag: String,

  /// Host-assigned key identifying special fragments.
  pub key: Option<String>,

  /// Ordered attribute pairs. An empty value serializes as a bare
  /// (boolean) attribute.
  pub attributes: Vec<(String, String)>,

  /// Child fragments, serialized after `inner_html`.
  pub children: Vec<Fragment>,

  /// Raw inner HTML, emitted verbatim.
  pub inner_html: Option<String>,
}

impl Fragment {
  /// Create an empty fragment with the given tag name.
  #[must_use]
  pub fn new(tag: &str) -> Self {
    Self {
      tag: tag.to_string(),
      ..Self::default()
    }
  }

  /// Set the host-assigned key.
  #[must_use]
  pub fn with_key(mut self, key: &str) -> Self {
    self.key = Some(key.to_string());
    self
  }

  /// Append an attribute.
  #[must_use]
  pub fn with_attr(mut self, name: &str, value: &str) -> Self {
    self.attributes.push((name.to_string(), value.to_string()));
    self
  }

  /// Set the raw inner HTML.
  #[must_use]
  pub fn with_inner_html(mut self, html: &str) -> Self {
    self.inner_html = Some(html.to_string());
    self
  }

  /// Append a child fragment.
  #[must_use]
  pub fn with_child(mut self, child: Self) -> Self {
    self.children.push(child);
    self
  }

  /// Look up an attribute value by name.
  #[must_use]
  pub fn attr(&self, name: &str) -> Option<&str> {
    self
      .attributes
      .iter()
      .find(|(attr_name, _)| attr_name == name)
      .map(|(_, value)| value.as_str())
  }

  /// Whether this fragment carries the given host-assigned key.
  #[must_use]
  pub fn has_key(&self, key: &str) -> bool {
    self.key.as_deref() == Some(key)
  }

  /// Serialize the fragment to HTML.
  ///
  /// Attribute values are escaped; `inner_html` is emitted verbatim. Void
  /// elements get no closing tag.
  #[must_use]
  pub fn to_html(&self) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(&self.tag);
    for (name, value) in &self.attributes {
      out.push(' ');
      out.push_str(name);
      if !value.is_empty() {
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
      }
    }
    out.push('>');

    if is_void_element(&self.tag) {
      return out;
    }

    if let Some(html) = &self.inner_html {
      out.push_str(html);
    }
    for child in &self.children {
      out.push_str(&child.to_html());
    }

    out.push_str("</");
    out.push_str(&self.tag);
    out.push('>');
    out
  }
}

/// The three fragment regions the host renderer exposes around the page
/// body. The host's get/replace registration hooks reduce to handing this
/// struct out by mutable reference.
#[derive(Debug, Clone, Default)]
pub struct PageRegions {
  /// Fragments rendered inside `<head>`.
  pub head: Vec<Fragment>,

  /// Fragments rendered just after `<body>` opens.
  pub pre_body: Vec<Fragment>,

  /// Fragments rendered just before `<body>` closes.
  pub post_body: Vec<Fragment>,
}

/// Check if an HTML tag is a void element (no closing tag).
#[inline]
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
  matches!(
    tag,
    "area"
      | "base"
      | "br"
      | "col"
      | "embed"
      | "hr"
      | "img"
      | "input"
      | "link"
      | "meta"
      | "source"
      | "track"
      | "wbr"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn serializes_attributes_and_children() {
    let fragment = Fragment::new("noscript").with_child(
      Fragment::new("style")
        .with_attr("amp-boilerplate", "")
        .with_inner_html("body{animation:none}"),
    );
    assert_eq!(
      fragment.to_html(),
      "<noscript><style amp-boilerplate>body{animation:none}</style></noscript>"
    );
  }

  #[test]
  fn void_elements_have_no_closing_tag() {
    let link = Fragment::new("link")
      .with_attr("rel", "canonical")
      .with_attr("href", "https://example.com/post/");
    assert_eq!(
      link.to_html(),
      "<link rel=\"canonical\" href=\"https://example.com/post/\">"
    );
  }

  #[test]
  fn attribute_values_are_escaped() {
    let meta = Fragment::new("meta").with_attr("content", "a\"b");
    assert_eq!(meta.to_html(), "<meta content=\"a&quot;b\">");
  }

  #[test]
  fn attr_lookup_finds_first_match() {
    let script = Fragment::new("script")
      .with_attr("type", "application/ld+json")
      .with_inner_html("{}");
    assert_eq!(script.attr("type"), Some("application/ld+json"));
    assert_eq!(script.attr("src"), None);
  }

  #[test]
  fn keys_are_matched_exactly() {
    let style = Fragment::new("style").with_key(TYPOGRAPHY_STYLE_KEY);
    assert!(style.has_key(TYPOGRAPHY_STYLE_KEY));
    assert!(!style.has_key(TAG_MANAGER_KEY));
  }
}
