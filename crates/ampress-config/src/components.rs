//! AMP custom-element component references.
use serde::{Deserialize, Serialize};

/// Script version assumed for components configured as bare names.
pub const DEFAULT_COMPONENT_VERSION: &str = "0.1";

/// A fully resolved AMP custom element: tag name plus the version of the
/// external script that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentDescriptor {
  /// Custom element name, e.g. `amp-youtube`.
  pub name:    String,
  /// Script version, e.g. `0.1`.
  pub version: String,
}

impl ComponentDescriptor {
  /// Create a descriptor from a name and version.
  #[must_use]
  pub fn new(name: &str, version: &str) -> Self {
    Self {
      name:    name.to_string(),
      version: version.to_string(),
    }
  }

  /// CDN URL of the script that declares this custom element.
  #[must_use]
  pub fn script_url(&self) -> String {
    format!(
      "https://cdn.ampproject.org/v0/{}-{}.js",
      self.name, self.version
    )
  }
}

/// A component entry as written in configuration.
///
/// Users may list either a bare element name (the script version defaults to
/// [`DEFAULT_COMPONENT_VERSION`]) or an explicit `{ name, version }` pair.
/// The variant is resolved once at config-load time via
/// [`ComponentRef::resolve`] so call sites never branch on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentRef {
  /// Bare element name, e.g. `"amp-youtube"`.
  Name(String),
  /// Explicit name and version.
  Descriptor { name: String, version: String },
}

impl ComponentRef {
  /// Resolve into a concrete [`ComponentDescriptor`].
  #[must_use]
  pub fn resolve(&self) -> ComponentDescriptor {
    match self {
      Self::Name(name) => {
        ComponentDescriptor::new(name, DEFAULT_COMPONENT_VERSION)
      },
      Self::Descriptor { name, version } => {
        ComponentDescriptor::new(name, version)
      },
    }
  }
}
