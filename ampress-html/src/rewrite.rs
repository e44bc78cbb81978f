//! Body rewriting: replaces images, embedded tweets, Instagram posts and
//! iframes with their AMP custom-element equivalents.
use kuchikikiki::{
  Attribute,
  ElementData,
  ExpandedName,
  NodeData,
  NodeDataRef,
  NodeRef,
};
use log::debug;
use markup5ever::{LocalName, QualName, ns};
use tendril::TendrilSink;

use ampress_config::ComponentDescriptor;

use crate::{error::RenderError, policy::Classification};

/// Default sizing for rewritten images and iframes.
const MEDIA_DEFAULTS: [(&str, &str); 3] =
  [("width", "640"), ("height", "475"), ("layout", "responsive")];

/// Default sizing for rewritten social embeds.
const EMBED_DEFAULTS: [(&str, &str); 3] =
  [("width", "390"), ("height", "330"), ("layout", "responsive")];

/// Attributes never copied onto `amp-img`/`amp-anim`.
const IMAGE_DENYLIST: [&str; 1] = ["loading"];

/// Attributes never copied onto `amp-youtube`.
const YOUTUBE_DENYLIST: [&str; 4] =
  ["allow", "allowfullscreen", "frameborder", "src"];

/// Result of rewriting a body: the serialized markup and the custom-element
/// descriptors the rewrite introduced.
#[derive(Debug, Clone)]
pub struct RewriteOutput {
  /// The rewritten body markup.
  pub html: String,

  /// Custom elements used by the rewritten markup, in order of first use,
  /// possibly with duplicates.
  pub components: Vec<ComponentDescriptor>,
}

/// Rewrite a body HTML string for the given page classification.
///
/// Canonical pages pass through untouched. AMP pages are parsed, rewritten
/// in place and re-serialized from the single root element inside `<body>`.
pub fn rewrite_body(
  html: &str,
  classification: Classification,
) -> Result<RewriteOutput, RenderError> {
  if !classification.is_amp {
    return Ok(RewriteOutput {
      html:       html.to_string(),
      components: Vec::new(),
    });
  }

  let document = kuchikikiki::parse_html().one(html);
  let components = rewrite_tree(&document);
  Ok(RewriteOutput {
    html: serialize_body_root(&document)?,
    components,
  })
}

/// Run every rewrite pass over a parsed tree in place, returning the
/// custom-element descriptors the passes introduced.
#[must_use]
pub fn rewrite_tree(root: &NodeRef) -> Vec<ComponentDescriptor> {
  let mut components = Vec::new();
  rewrite_images(root, &mut components);
  rewrite_tweets(root, &mut components);
  rewrite_instagram(root, &mut components);
  rewrite_iframes(root, &mut components);
  components
}

/// Replace `<img>` elements with `amp-img`, or `amp-anim` for GIFs.
fn rewrite_images(root: &NodeRef, components: &mut Vec<ComponentDescriptor>) {
  let mut to_replace = Vec::new();

  for image in select_all(root, "img") {
    let src = image
      .attributes
      .borrow()
      .get("src")
      .map(ToString::to_string)
      .unwrap_or_default();

    let tag = if src.ends_with(".gif") {
      components.push(ComponentDescriptor::new("amp-anim", "0.1"));
      "amp-anim"
    } else {
      "amp-img"
    };

    let replacement = create_element(tag);
    let copied =
      copy_attributes(&image, &replacement, &IMAGE_DENYLIST);
    apply_defaults(&replacement, &copied, &MEDIA_DEFAULTS);
    to_replace.push((image.as_node().clone(), replacement));
  }

  apply_replacements(to_replace);
}

/// Replace embedded tweets (elements with the `twitter-tweet` class) with
/// `amp-twitter`, keeping the original markup as the placeholder.
fn rewrite_tweets(root: &NodeRef, components: &mut Vec<ComponentDescriptor>) {
  let mut to_replace = Vec::new();

  for tweet in select_all(root, ".twitter-tweet") {
    // The status link is the last anchor in the embed.
    let Some(anchor) = select_all(tweet.as_node(), "a").into_iter().last()
    else {
      debug!("Skipping tweet embed without a status link");
      continue;
    };
    let href = anchor
      .attributes
      .borrow()
      .get("href")
      .map(ToString::to_string)
      .unwrap_or_default();
    let tweet_id = last_path_segment(&href);

    components.push(ComponentDescriptor::new("amp-twitter", "0.1"));

    let replacement = create_element("amp-twitter");
    let copied = copy_attributes(&tweet, &replacement, &[]);
    apply_defaults(&replacement, &copied, &EMBED_DEFAULTS);
    set_attribute(&replacement, "data-tweetid", &tweet_id);
    if let Some(placeholder) = clone_subtree(tweet.as_node()) {
      set_attribute(&placeholder, "placeholder", "");
      replacement.append(placeholder);
    }
    to_replace.push((tweet.as_node().clone(), replacement));
  }

  apply_replacements(to_replace);
}

/// Replace embedded Instagram posts (elements with the `instagram-media`
/// class) with `amp-instagram`, keeping the original markup as the
/// placeholder.
fn rewrite_instagram(
  root: &NodeRef,
  components: &mut Vec<ComponentDescriptor>,
) {
  let mut to_replace = Vec::new();

  for embed in select_all(root, ".instagram-media") {
    let permalink = embed
      .attributes
      .borrow()
      .get("data-instgrm-permalink")
      .map(ToString::to_string)
      .unwrap_or_default();
    // Permalinks end with a trailing slash, so the shortcode is the
    // second-to-last segment.
    let segments: Vec<&str> = permalink.split('/').collect();
    if segments.len() < 2 {
      debug!("Skipping Instagram embed without a permalink");
      continue;
    }
    let shortcode = segments[segments.len() - 2];

    components.push(ComponentDescriptor::new("amp-instagram", "0.1"));

    let replacement = create_element("amp-instagram");
    let copied = copy_attributes(&embed, &replacement, &[]);
    apply_defaults(&replacement, &copied, &EMBED_DEFAULTS);
    set_attribute(&replacement, "data-shortcode", shortcode);
    if let Some(placeholder) = clone_subtree(embed.as_node()) {
      set_attribute(&placeholder, "placeholder", "");
      replacement.append(placeholder);
    }
    to_replace.push((embed.as_node().clone(), replacement));
  }

  apply_replacements(to_replace);
}

/// Replace `<iframe>` elements with `amp-youtube` for YouTube embeds and
/// `amp-iframe` for everything else.
fn rewrite_iframes(root: &NodeRef, components: &mut Vec<ComponentDescriptor>) {
  let mut to_replace = Vec::new();

  for iframe in select_all(root, "iframe") {
    let src = iframe
      .attributes
      .borrow()
      .get("src")
      .map(ToString::to_string)
      .unwrap_or_default();

    let replacement = if src.contains("youtube.com/embed/") {
      components.push(ComponentDescriptor::new("amp-youtube", "0.1"));
      let video_id = last_path_segment(&src);
      let youtube = create_element("amp-youtube");
      let copied = copy_attributes(&iframe, &youtube, &YOUTUBE_DENYLIST);
      apply_defaults(&youtube, &copied, &MEDIA_DEFAULTS);
      set_attribute(&youtube, "data-videoid", &video_id);

      let thumbnail = create_element("amp-img");
      set_attribute(
        &thumbnail,
        "src",
        &format!("https://i.ytimg.com/vi/{video_id}/mqdefault.jpg"),
      );
      set_attribute(&thumbnail, "placeholder", "");
      set_attribute(&thumbnail, "layout", "fill");
      youtube.append(thumbnail);
      youtube
    } else {
      components.push(ComponentDescriptor::new("amp-iframe", "0.1"));
      let generic = create_element("amp-iframe");
      let copied = copy_attributes(&iframe, &generic, &[]);
      apply_defaults(&generic, &copied, &MEDIA_DEFAULTS);
      generic
    };

    to_replace.push((iframe.as_node().clone(), replacement));
  }

  apply_replacements(to_replace);
}

/// Serialize the single root element inside `<body>`.
fn serialize_body_root(document: &NodeRef) -> Result<String, RenderError> {
  let body = document
    .select_first("body")
    .map_err(|()| RenderError::Parse("document has no body".to_string()))?;
  let root = body
    .as_node()
    .children()
    .find(|child| child.as_element().is_some())
    .ok_or_else(|| {
      RenderError::Parse("body has no root element".to_string())
    })?;

  let mut out = Vec::new();
  root
    .serialize(&mut out)
    .map_err(|e| RenderError::Serialize(e.to_string()))?;
  Ok(String::from_utf8(out)?)
}

/// Select every node matching a CSS selector. Selector parse failures yield
/// an empty result.
fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeDataRef<ElementData>> {
  root
    .select(selector)
    .map_or_else(|()| Vec::new(), Iterator::collect)
}

fn create_element(tag: &str) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), LocalName::from(tag)),
    Vec::<(ExpandedName, Attribute)>::new(),
  )
}

fn set_attribute(node: &NodeRef, name: &str, value: &str) {
  if let Some(element) = node.as_element() {
    element.attributes.borrow_mut().insert(name, value.to_string());
  }
}

/// Copy attributes from a source element onto a replacement, skipping the
/// denylisted names. Returns the names that were copied.
fn copy_attributes(
  source: &NodeDataRef<ElementData>,
  target: &NodeRef,
  denylist: &[&str],
) -> Vec<String> {
  let mut copied = Vec::new();
  if let Some(element) = target.as_element() {
    let mut target_attrs = element.attributes.borrow_mut();
    for (name, attribute) in &source.attributes.borrow().map {
      let name = name.local.to_string();
      if denylist.contains(&name.as_str()) {
        continue;
      }
      target_attrs.insert(name.as_str(), attribute.value.clone());
      copied.push(name);
    }
  }
  copied
}

/// Fill in default attributes that were not copied from the source.
fn apply_defaults(
  target: &NodeRef,
  copied: &[String],
  defaults: &[(&str, &str)],
) {
  for (name, value) in defaults {
    if !copied.iter().any(|copied_name| copied_name == name) {
      set_attribute(target, name, value);
    }
  }
}

fn apply_replacements(replacements: Vec<(NodeRef, NodeRef)>) {
  for (old, new) in replacements {
    old.insert_before(new);
    old.detach();
  }
}

/// Deep-copy an element, text or comment subtree. Other node kinds are
/// skipped.
fn clone_subtree(node: &NodeRef) -> Option<NodeRef> {
  match node.data() {
    NodeData::Element(element) => {
      let attributes: Vec<(ExpandedName, Attribute)> = element
        .attributes
        .borrow()
        .map
        .iter()
        .map(|(name, attribute)| (name.clone(), attribute.clone()))
        .collect();
      let copy = NodeRef::new_element(element.name.clone(), attributes);
      for child in node.children() {
        if let Some(child_copy) = clone_subtree(&child) {
          copy.append(child_copy);
        }
      }
      Some(copy)
    },
    NodeData::Text(contents) => {
      Some(NodeRef::new_text(contents.borrow().clone()))
    },
    NodeData::Comment(contents) => {
      Some(NodeRef::new_comment(contents.borrow().clone()))
    },
    _ => None,
  }
}

/// The last path segment of a URL, with any query string removed.
fn last_path_segment(url: &str) -> String {
  url
    .rsplit('/')
    .next()
    .and_then(|segment| segment.split('?').next())
    .unwrap_or_default()
    .to_string()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::policy::Classification;

  const AMP: Classification = Classification { is_amp: true };
  const CANONICAL: Classification = Classification { is_amp: false };

  fn rewrite(html: &str) -> RewriteOutput {
    rewrite_body(html, AMP).unwrap()
  }

  #[test]
  fn canonical_pages_pass_through() {
    let html = "<div><img src=\"/a.png\"></div>";
    let out = rewrite_body(html, CANONICAL).unwrap();
    assert_eq!(out.html, html);
    assert!(out.components.is_empty());
  }

  #[test]
  fn images_become_amp_img_with_defaults() {
    let out = rewrite("<div><img src=\"/photo.png\" alt=\"x\"></div>");
    assert!(out.html.contains("<amp-img"));
    assert!(!out.html.contains("<img"));
    assert!(out.html.contains("src=\"/photo.png\""));
    assert!(out.html.contains("alt=\"x\""));
    assert!(out.html.contains("width=\"640\""));
    assert!(out.html.contains("height=\"475\""));
    assert!(out.html.contains("layout=\"responsive\""));
    assert!(out.components.is_empty());
  }

  #[test]
  fn explicit_dimensions_are_kept() {
    let out =
      rewrite("<div><img src=\"/p.png\" width=\"100\" height=\"50\"></div>");
    assert!(out.html.contains("width=\"100\""));
    assert!(out.html.contains("height=\"50\""));
    assert!(out.html.contains("layout=\"responsive\""));
  }

  #[test]
  fn loading_attribute_is_dropped() {
    let out = rewrite("<div><img src=\"/p.png\" loading=\"lazy\"></div>");
    assert!(!out.html.contains("loading"));
  }

  #[test]
  fn gifs_become_amp_anim() {
    let out = rewrite("<div><img src=\"/fun.gif\"></div>");
    assert!(out.html.contains("<amp-anim"));
    assert_eq!(
      out.components,
      vec![ComponentDescriptor::new("amp-anim", "0.1")]
    );
  }

  #[test]
  fn tweets_become_amp_twitter_with_placeholder() {
    let out = rewrite(
      "<div><blockquote class=\"twitter-tweet\"><p>hi</p>\
       <a href=\"https://twitter.com/a/status/999?s=20\">link</a>\
       </blockquote></div>",
    );
    assert!(out.html.contains("<amp-twitter"));
    assert!(out.html.contains("data-tweetid=\"999\""));
    assert!(out.html.contains("width=\"390\""));
    assert!(out.html.contains("height=\"330\""));
    // The original embed survives inside as the placeholder.
    assert!(out.html.contains("placeholder"));
    assert!(out.html.contains("<blockquote"));
    assert_eq!(
      out.components,
      vec![ComponentDescriptor::new("amp-twitter", "0.1")]
    );
  }

  #[test]
  fn tweet_without_status_link_is_left_alone() {
    let html = "<div><blockquote class=\"twitter-tweet\"><p>hi</p>\
                </blockquote></div>";
    let out = rewrite(html);
    assert!(!out.html.contains("amp-twitter"));
    assert!(out.html.contains("twitter-tweet"));
    assert!(out.components.is_empty());
  }

  #[test]
  fn instagram_embeds_become_amp_instagram() {
    let out = rewrite(
      "<div><blockquote class=\"instagram-media\" \
       data-instgrm-permalink=\"https://www.instagram.com/p/Bx12345/\">\
       <p>post</p></blockquote></div>",
    );
    assert!(out.html.contains("<amp-instagram"));
    assert!(out.html.contains("data-shortcode=\"Bx12345\""));
    assert!(out.html.contains("placeholder"));
    assert_eq!(
      out.components,
      vec![ComponentDescriptor::new("amp-instagram", "0.1")]
    );
  }

  #[test]
  fn instagram_embed_without_permalink_is_left_alone() {
    let out = rewrite(
      "<div><blockquote class=\"instagram-media\"><p>post</p>\
       </blockquote></div>",
    );
    assert!(!out.html.contains("amp-instagram"));
    assert!(out.html.contains("instagram-media"));
    assert!(out.components.is_empty());
  }

  #[test]
  fn youtube_iframes_become_amp_youtube() {
    let out = rewrite(
      "<div><iframe src=\"https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0\" \
       width=\"560\" height=\"315\" frameborder=\"0\" allowfullscreen>\
       </iframe></div>",
    );
    assert!(out.html.contains("<amp-youtube"));
    assert!(out.html.contains("data-videoid=\"dQw4w9WgXcQ\""));
    assert!(out.html.contains("width=\"560\""));
    assert!(out.html.contains("height=\"315\""));
    assert!(!out.html.contains("frameborder"));
    assert!(!out.html.contains("allowfullscreen"));
    assert!(out.html.contains(
      "https://i.ytimg.com/vi/dQw4w9WgXcQ/mqdefault.jpg"
    ));
    assert!(out.html.contains("layout=\"fill\""));
    assert_eq!(
      out.components,
      vec![ComponentDescriptor::new("amp-youtube", "0.1")]
    );
  }

  #[test]
  fn other_iframes_become_amp_iframe() {
    let out = rewrite(
      "<div><iframe src=\"https://example.com/map\" \
       sandbox=\"allow-scripts\"></iframe></div>",
    );
    assert!(out.html.contains("<amp-iframe"));
    assert!(out.html.contains("src=\"https://example.com/map\""));
    assert!(out.html.contains("sandbox=\"allow-scripts\""));
    assert!(out.html.contains("width=\"640\""));
    assert_eq!(
      out.components,
      vec![ComponentDescriptor::new("amp-iframe", "0.1")]
    );
  }

  #[test]
  fn rewriting_is_idempotent_for_media() {
    let first =
      rewrite("<div><img src=\"/p.png\"><iframe src=\"/x\"></iframe></div>");
    let second = rewrite(&first.html);
    assert_eq!(first.html, second.html);
    assert!(second.components.is_empty());
  }

  #[test]
  fn multiple_gifs_report_each_use() {
    let out =
      rewrite("<div><img src=\"/a.gif\"><img src=\"/b.gif\"></div>");
    assert_eq!(out.components.len(), 2);
  }

  #[test]
  fn missing_root_element_is_an_error() {
    assert!(rewrite_body("", AMP).is_err());
  }
}
