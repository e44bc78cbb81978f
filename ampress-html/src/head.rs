//! Head assembly: the AMP boilerplate, custom-element scripts, stylesheet
//! consolidation and link tags.
use std::collections::HashMap;

use ampress_config::{
  AnalyticsConfig,
  AnalyticsSource,
  ComponentDescriptor,
  Config,
};
use log::debug;

use crate::{
  fragment::{Fragment, PageRegions, TAG_MANAGER_KEY, TYPOGRAPHY_STYLE_KEY},
  policy,
  utils,
};

/// URL of the AMP runtime script required on every AMP page.
pub const AMP_RUNTIME_URL: &str = "https://cdn.ampproject.org/v0.js";

/// Boilerplate CSS AMP requires on every page to avoid a flash of unstyled
/// content while the runtime loads.
pub const AMP_BOILERPLATE: &str = "body{-webkit-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-moz-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-ms-animation:-amp-start 8s steps(1,end) 0s 1 normal both;animation:-amp-start 8s steps(1,end) 0s 1 normal both}@-webkit-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-moz-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-ms-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-o-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}";

/// Counterpart boilerplate for browsers with scripting disabled.
pub const AMP_NOSCRIPT_BOILERPLATE: &str = "body{-webkit-animation:none;-moz-animation:none;-ms-animation:none;animation:none}";

/// Fragments produced by the body-rendering hook, applied before head
/// assembly: root-element attributes plus head and pre-body additions.
#[derive(Debug, Clone, Default)]
pub struct BodySetup {
  /// Attributes to set on the root `<html>` element.
  pub html_attributes: Vec<(String, String)>,

  /// Fragments prepended to the head region.
  pub head: Vec<Fragment>,

  /// Fragments prepended to the pre-body region.
  pub pre_body: Vec<Fragment>,
}

/// Rewrite the page regions for the final render.
///
/// On AMP pages this replaces the head with the AMP runtime, boilerplate,
/// consolidated stylesheet and custom-element scripts, then filters the
/// original fragments down to the AMP-legal subset; pre- and post-body
/// regions are filtered likewise. On canonical pages it prepends a single
/// amphtml discovery link when the path policy allows one.
///
/// `body_components` are the descriptors collected while rewriting the page
/// body; they are merged with the configured components and deduplicated.
pub fn pre_render(
  regions: &mut PageRegions,
  pathname: &str,
  body_components: &[ComponentDescriptor],
  config: &Config,
) {
  let classification = policy::classify(pathname, &config.path_identifier);

  if classification.is_amp {
    debug!("Assembling AMP head for {pathname}");
    assemble_amp_regions(regions, body_components, config);
  } else if policy::should_emit_discovery_link(
    pathname,
    &config.included_paths,
    &config.excluded_paths,
  ) {
    let href = discovery_href(pathname, config);
    regions.head.insert(
      0,
      Fragment::new("link")
        .with_attr("rel", "amphtml")
        .with_attr("href", &href),
    );
  }
}

/// Produce the body-rendering side channel for a page: the `amp` root
/// attribute, the canonical link, the optional client-id meta tag and the
/// `amp-analytics` pre-body element. Empty on canonical pages.
#[must_use]
pub fn render_body_setup(pathname: &str, config: &Config) -> BodySetup {
  let classification = policy::classify(pathname, &config.path_identifier);
  if !classification.is_amp {
    return BodySetup::default();
  }

  let mut head = vec![
    Fragment::new("link")
      .with_attr("rel", "canonical")
      .with_attr("href", &canonical_href(pathname, config)),
  ];
  if config.use_amp_client_id_api {
    head.push(
      Fragment::new("meta")
        .with_attr("name", "amp-google-client-id-api")
        .with_attr("content", "googleanalytics"),
    );
  }

  let mut pre_body = Vec::new();
  if let Some(analytics) = &config.analytics {
    pre_body.push(analytics_element(analytics, pathname));
  }

  BodySetup {
    html_attributes: vec![("amp".to_string(), String::new())],
    head,
    pre_body,
  }
}

/// Replace the head with the fixed AMP preamble followed by the AMP-legal
/// subset of the original fragments, and filter the body-adjacent regions.
fn assemble_amp_regions(
  regions: &mut PageRegions,
  body_components: &[ComponentDescriptor],
  config: &Config,
) {
  let styles = collect_styles(&regions.head);

  let mut head = vec![
    Fragment::new("script")
      .with_attr("async", "")
      .with_attr("src", AMP_RUNTIME_URL),
    Fragment::new("style")
      .with_attr("amp-boilerplate", "")
      .with_inner_html(AMP_BOILERPLATE),
    Fragment::new("noscript").with_child(
      Fragment::new("style")
        .with_attr("amp-boilerplate", "")
        .with_inner_html(AMP_NOSCRIPT_BOILERPLATE),
    ),
    Fragment::new("style")
      .with_attr("amp-custom", "")
      .with_inner_html(&styles),
  ];

  let components = dedup_components(
    config
      .resolved_components()
      .into_iter()
      .chain(body_components.iter().cloned()),
  );
  for descriptor in &components {
    head.push(component_script(descriptor));
  }

  if config.analytics.is_some() {
    head.push(component_script(&ComponentDescriptor::new(
      "amp-analytics",
      "0.1",
    )));
  }

  head.extend(
    regions
      .head
      .drain(..)
      .filter(is_amp_legal_head_fragment),
  );
  regions.head = head;

  regions
    .pre_body
    .retain(|fragment| !fragment.has_key(TAG_MANAGER_KEY));
  regions.post_body.retain(|fragment| fragment.tag != "script");
}

/// Concatenate the inline stylesheets from the head region into one
/// `amp-custom` stylesheet. The typography fragment, when present, is
/// prepended to the accumulation; `!important` is stripped throughout.
fn collect_styles(head: &[Fragment]) -> String {
  let mut styles = String::new();
  for fragment in head {
    // The key wins over the tag: the typography stylesheet is itself a
    // style fragment, and it must end up first.
    if fragment.has_key(TYPOGRAPHY_STYLE_KEY) {
      if let Some(css) = &fragment.inner_html {
        styles = format!("{css}{styles}");
      }
    } else if fragment.tag == "style" {
      if let Some(css) = &fragment.inner_html {
        styles.push_str(css);
      }
    }
  }
  utils::strip_important(&styles)
}

/// Whether an original head fragment may remain on an AMP page.
///
/// Styles are consolidated separately, scripts other than JSON-LD are
/// forbidden, and preload hints for scripts and fetches are meaningless
/// without them.
fn is_amp_legal_head_fragment(fragment: &Fragment) -> bool {
  if fragment.tag == "style" || fragment.has_key(TYPOGRAPHY_STYLE_KEY) {
    return false;
  }
  if fragment.tag == "script"
    && fragment.attr("type") != Some("application/ld+json")
  {
    return false;
  }
  if fragment.tag == "link"
    && fragment.attr("rel") == Some("preload")
    && matches!(fragment.attr("as"), Some("script" | "fetch"))
  {
    return false;
  }
  true
}

/// Script tag declaring one AMP custom element.
fn component_script(descriptor: &ComponentDescriptor) -> Fragment {
  Fragment::new("script")
    .with_attr("async", "")
    .with_attr("custom-element", &descriptor.name)
    .with_attr("src", &descriptor.script_url())
}

/// Deduplicate descriptors by `(name, version)`, keeping first-seen order.
fn dedup_components<I>(descriptors: I) -> Vec<ComponentDescriptor>
where
  I: IntoIterator<Item = ComponentDescriptor>,
{
  let mut unique: Vec<ComponentDescriptor> = Vec::new();
  for descriptor in descriptors {
    if !unique.contains(&descriptor) {
      unique.push(descriptor);
    }
  }
  unique
}

/// The amphtml discovery link href for a canonical page.
fn discovery_href(pathname: &str, config: &Config) -> String {
  let map = HashMap::from([
    ("canonicalBaseUrl", config.canonical_base_url.as_str()),
    ("pathIdentifier", config.path_identifier.as_str()),
    ("pathname", pathname),
  ]);
  utils::collapse_slashes(&utils::interpolate(
    &config.rel_amp_html_pattern,
    &map,
  ))
}

/// The canonical link href for an AMP page: the canonical template with the
/// path identifier removed.
fn canonical_href(pathname: &str, config: &Config) -> String {
  let map = HashMap::from([
    ("canonicalBaseUrl", config.canonical_base_url.as_str()),
    ("pathname", pathname),
  ]);
  let href = utils::interpolate(&config.rel_canonical_pattern, &map)
    .replacen(&config.path_identifier, "", 1);
  utils::collapse_slashes(&href)
}

/// The `amp-analytics` pre-body element.
fn analytics_element(analytics: &AnalyticsConfig, pathname: &str) -> Fragment {
  let mut element =
    Fragment::new("amp-analytics").with_attr("type", &analytics.kind);
  if let Some(credentials) = &analytics.data_credentials {
    element = element.with_attr("data-credentials", credentials);
  }
  match &analytics.config {
    Some(AnalyticsSource::Remote(url)) => element.with_attr("config", url),
    Some(AnalyticsSource::Inline(value)) => {
      // Display on a JSON value is infallible and emits compact JSON.
      let json = value.to_string();
      let map = HashMap::from([("pathname", pathname)]);
      element.with_child(
        Fragment::new("script")
          .with_attr("type", "application/json")
          .with_inner_html(&utils::interpolate(&json, &map)),
      )
    },
    None => element,
  }
}
