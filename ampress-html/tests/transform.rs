#![allow(clippy::unwrap_used, reason = "Fine in tests")]

use ampress_config::{ComponentRef, Config};
use ampress_html::{
  Fragment,
  PageRegions,
  classify,
  head,
  pre_render,
  render_body_setup,
  rewrite_body,
};

fn config() -> Config {
  Config {
    canonical_base_url: "https://example.com".to_string(),
    components: vec![ComponentRef::Name("amp-sidebar".to_string())],
    ..Config::default()
  }
}

#[test]
fn full_amp_page_transformation() {
  let config = config();
  let pathname = "/articles/first-post/amp/";
  let classification = classify(pathname, &config.path_identifier);
  assert!(classification.is_amp);

  let body = "<div>\
              <img src=\"/cat.gif\">\
              <iframe src=\"https://www.youtube.com/embed/abc123\"></iframe>\
              </div>";
  let rewritten = rewrite_body(body, classification).unwrap();
  assert!(rewritten.html.contains("<amp-anim"));
  assert!(rewritten.html.contains("<amp-youtube"));

  let setup = render_body_setup(pathname, &config);
  assert_eq!(
    setup.html_attributes,
    vec![("amp".to_string(), String::new())]
  );

  let mut regions = PageRegions {
    head: {
      let mut fragments = setup.head.clone();
      fragments.extend([
        Fragment::new("meta").with_attr("charset", "utf-8"),
        Fragment::new("style").with_inner_html("p{margin:0!important}"),
        Fragment::new("script").with_attr("src", "/framework.js"),
      ]);
      fragments
    },
    ..PageRegions::default()
  };
  pre_render(&mut regions, pathname, &rewritten.components, &config);

  // Fixed preamble order.
  assert_eq!(regions.head[0].attr("src"), Some(head::AMP_RUNTIME_URL));
  assert_eq!(regions.head[1].attr("amp-boilerplate"), Some(""));
  assert_eq!(regions.head[2].tag, "noscript");
  assert_eq!(regions.head[3].inner_html.as_deref(), Some("p{margin:0}"));

  // Configured and body-collected components each get one script.
  let component_names: Vec<_> = regions
    .head
    .iter()
    .filter_map(|fragment| fragment.attr("custom-element"))
    .collect();
  assert_eq!(
    component_names,
    vec!["amp-sidebar", "amp-anim", "amp-youtube"]
  );

  // The framework script is gone, the charset meta and canonical survive.
  assert!(!regions.head.iter().any(|f| f.attr("src") == Some("/framework.js")));
  assert!(
    regions
      .head
      .iter()
      .any(|f| f.attr("charset") == Some("utf-8"))
  );
  assert!(regions.head.iter().any(|f| {
    f.attr("rel") == Some("canonical")
      && f.attr("href") == Some("https://example.com/articles/first-post")
  }));
}

#[test]
fn canonical_page_only_gains_discovery_link() {
  let config = config();
  let pathname = "/articles/first-post/";
  let classification = classify(pathname, &config.path_identifier);
  assert!(!classification.is_amp);

  let body = "<div><img src=\"/cat.png\"></div>";
  let rewritten = rewrite_body(body, classification).unwrap();
  assert_eq!(rewritten.html, body);

  let mut regions = PageRegions {
    head: vec![Fragment::new("meta").with_attr("charset", "utf-8")],
    ..PageRegions::default()
  };
  pre_render(&mut regions, pathname, &rewritten.components, &config);

  assert_eq!(regions.head.len(), 2);
  assert_eq!(regions.head[0].attr("rel"), Some("amphtml"));
  assert_eq!(
    regions.head[0].attr("href"),
    Some("https://example.com/articles/first-post/amp/")
  );
}
