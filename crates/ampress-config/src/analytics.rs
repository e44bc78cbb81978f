//! Analytics configuration carried onto AMP pages.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for the `amp-analytics` element emitted on AMP pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
  /// Analytics vendor type, e.g. `gtag` or `googleanalytics`.
  #[serde(rename = "type")]
  pub kind: String,

  /// Value for the `data-credentials` attribute, if any.
  #[serde(default)]
  pub data_credentials: Option<String>,

  /// Analytics configuration source.
  #[serde(default)]
  pub config: Option<AnalyticsSource>,
}

/// Where the analytics configuration lives.
///
/// A string is treated as a URL referencing a remote config (emitted as the
/// `config` attribute); an object is inlined as a JSON `<script>` child of
/// the `amp-analytics` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyticsSource {
  /// URL of an externally hosted configuration.
  Remote(String),
  /// Inline JSON configuration object.
  Inline(Value),
}
