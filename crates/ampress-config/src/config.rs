use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
  analytics::AnalyticsConfig,
  components::{ComponentDescriptor, ComponentRef},
  error::ConfigError,
};

/// Default substring that marks a pathname as an AMP variant.
pub const DEFAULT_PATH_IDENTIFIER: &str = "/amp/";

/// Default template for the `<link rel="amphtml">` href on canonical pages.
pub const DEFAULT_REL_AMP_HTML_PATTERN: &str =
  "{{canonicalBaseUrl}}{{pathname}}{{pathIdentifier}}";

/// Default template for the `<link rel="canonical">` href on AMP pages.
pub const DEFAULT_REL_CANONICAL_PATTERN: &str =
  "{{canonicalBaseUrl}}{{pathname}}";

/// Configuration for the AMP page transformation.
///
/// [`Config`] holds all options controlling classification, discovery-link
/// emission, head assembly and analytics. Fields are typically loaded from a
/// TOML or JSON config file; every field has a default, so an empty file is a
/// valid configuration. Option values are deliberately not validated beyond
/// parsing; transformation is best effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Substring whose presence in a pathname marks the page as AMP.
  pub path_identifier: String,

  /// Base URL interpolated into the link templates as
  /// `{{canonicalBaseUrl}}`.
  pub canonical_base_url: String,

  /// AMP custom elements to declare in the head of every AMP page, in
  /// addition to the ones derived from the page body.
  pub components: Vec<ComponentRef>,

  /// Glob patterns of canonical pages that should advertise an AMP
  /// counterpart. A matching page always gets the discovery link.
  pub included_paths: Vec<String>,

  /// Glob patterns of canonical pages that should *not* advertise an AMP
  /// counterpart. When non-empty, every non-matching page gets the link.
  pub excluded_paths: Vec<String>,

  /// Template for the amphtml discovery link href.
  pub rel_amp_html_pattern: String,

  /// Template for the canonical link href emitted on AMP pages.
  pub rel_canonical_pattern: String,

  /// Analytics configuration; when present, AMP pages carry an
  /// `amp-analytics` element and its custom-element script.
  pub analytics: Option<AnalyticsConfig>,

  /// Emit the `amp-google-client-id-api` meta tag on AMP pages.
  pub use_amp_client_id_api: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      path_identifier:       DEFAULT_PATH_IDENTIFIER.to_string(),
      canonical_base_url:    String::new(),
      components:            Vec::new(),
      included_paths:        Vec::new(),
      excluded_paths:        Vec::new(),
      rel_amp_html_pattern:  DEFAULT_REL_AMP_HTML_PATTERN.to_string(),
      rel_canonical_pattern: DEFAULT_REL_CANONICAL_PATTERN.to_string(),
      analytics:             None,
      use_amp_client_id_api: false,
    }
  }
}

impl Config {
  /// Resolve the configured component list into concrete descriptors.
  #[must_use]
  pub fn resolved_components(&self) -> Vec<ComponentDescriptor> {
    self
      .components
      .iter()
      .map(ComponentRef::resolve)
      .collect()
  }

  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format
  /// is unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => {
            serde_json::from_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse JSON config from {}: {}",
                path.display(),
                e
              ))
            })
          },
          "toml" => {
            toml::from_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse TOML config from {}: {}",
                path.display(),
                e
              ))
            })
          },
          _ => {
            Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )))
          },
        }
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from an explicitly given file, or discover one in
  /// the current directory, or fall back to defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if an explicitly given or discovered file cannot be
  /// loaded.
  pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = config_file {
      return Self::from_file(path);
    }

    for filename in ["ampress.toml", "ampress.json", ".ampress.toml"] {
      let candidate = Path::new(filename);
      if candidate.exists() {
        log::info!("Using discovered config file: {filename}");
        return Self::from_file(candidate);
      }
    }

    Ok(Self::default())
  }

  /// Generate a default configuration file with commented explanations.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unknown or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let content = crate::templates::get_template(format)?;

    fs::write(path, content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}
