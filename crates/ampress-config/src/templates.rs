//! Embedded default configuration templates.
use crate::error::ConfigError;

const DEFAULT_TOML: &str = r##"# ampress configuration
#
# Every option has a default; delete anything you do not need.

# Substring whose presence in a pathname marks the page as an AMP variant.
path_identifier = "/amp/"

# Base URL substituted for {{canonicalBaseUrl}} in the link templates.
canonical_base_url = ""

# AMP custom elements to declare on every AMP page, in addition to the ones
# derived from the page body. Entries are either a bare name (version 0.1)
# or an explicit { name, version } pair.
components = []

# Glob patterns controlling the amphtml discovery link on canonical pages.
# If excluded_paths is non-empty, pages matching none of it get the link.
# Pages matching included_paths always get it. If both lists are empty,
# every canonical page gets it.
included_paths = []
excluded_paths = []

# Templates for the discovery and canonical link hrefs.
rel_amp_html_pattern = "{{canonicalBaseUrl}}{{pathname}}{{pathIdentifier}}"
rel_canonical_pattern = "{{canonicalBaseUrl}}{{pathname}}"

# Emit the amp-google-client-id-api meta tag on AMP pages.
use_amp_client_id_api = false

# Analytics for AMP pages. `config` is either a URL string or an inline
# table; inline tables are serialized to JSON with {{pathname}} interpolated.
# [analytics]
# type = "gtag"
# data_credentials = "include"
# config = "https://example.com/analytics.json"
"##;

const DEFAULT_JSON: &str = r#"{
  "path_identifier": "/amp/",
  "canonical_base_url": "",
  "components": [],
  "included_paths": [],
  "excluded_paths": [],
  "rel_amp_html_pattern": "{{canonicalBaseUrl}}{{pathname}}{{pathIdentifier}}",
  "rel_canonical_pattern": "{{canonicalBaseUrl}}{{pathname}}",
  "use_amp_client_id_api": false
}
"#;

/// Get the embedded default configuration for the given format.
///
/// # Errors
///
/// Returns an error if the format is not `toml` or `json`.
pub fn get_template(format: &str) -> Result<&'static str, ConfigError> {
  match format {
    "toml" => Ok(DEFAULT_TOML),
    "json" => Ok(DEFAULT_JSON),
    other => {
      Err(ConfigError::Config(format!(
        "Unsupported config format: {other}. Use 'toml' or 'json'."
      )))
    },
  }
}
