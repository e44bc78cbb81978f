//! Whole-document transformation for statically rendered pages.
//!
//! A rendered HTML file is parsed once, its head and trailing body scripts
//! are lifted into fragment regions, the body is rewritten in place, and
//! the page is re-serialized with the assembled regions.
use std::{
  fs,
  path::{Path, PathBuf},
};

use ampress_config::Config;
use ampress_html::{
  Fragment,
  PageRegions,
  RenderError,
  classify,
  pre_render,
  render_body_setup,
  rewrite::rewrite_tree,
};
use kuchikikiki::{NodeData, NodeRef};
use log::{debug, error, info};
use rayon::prelude::*;
use tendril::TendrilSink;
use walkdir::WalkDir;

/// Attribute naming a fragment for head assembly, e.g. the typography
/// stylesheet. Consumed during extraction; never serialized back out.
const FRAGMENT_KEY_ATTRIBUTE: &str = "data-ampress-key";

/// Transform one rendered HTML document.
///
/// The pathname decides everything: AMP pages get their body rewritten and
/// their head rebuilt, canonical pages at most gain an amphtml discovery
/// link.
pub fn transform_document(
  html: &str,
  pathname: &str,
  config: &Config,
) -> Result<String, RenderError> {
  let document = kuchikikiki::parse_html().one(html);
  let classification = classify(pathname, &config.path_identifier);

  let setup = render_body_setup(pathname, config);
  let components = if classification.is_amp {
    rewrite_tree(&document)
  } else {
    Vec::new()
  };

  let head = document
    .select_first("head")
    .map_err(|()| RenderError::Parse("document has no head".to_string()))?;
  let body = document
    .select_first("body")
    .map_err(|()| RenderError::Parse("document has no body".to_string()))?;

  let mut regions = PageRegions {
    head:      setup.head,
    pre_body:  setup.pre_body,
    post_body: extract_trailing_scripts(body.as_node())?,
  };
  for child in head.as_node().children() {
    if child.as_element().is_some() {
      regions.head.push(element_to_fragment(&child)?);
    }
  }
  pre_render(&mut regions, pathname, &components, config);

  let mut html_attributes = Vec::new();
  if let Ok(root) = document.select_first("html") {
    for (name, attribute) in &root.attributes.borrow().map {
      html_attributes
        .push((name.local.to_string(), attribute.value.clone()));
    }
  }
  html_attributes.extend(setup.html_attributes);

  Ok(reassemble(
    &regions,
    &html_attributes,
    &serialize_children(body.as_node())?,
  ))
}

/// Transform every HTML page under `input_dir` into `output_dir`, keeping
/// the directory layout. Non-HTML files are copied through unchanged.
pub fn build_site(
  input_dir: &Path,
  output_dir: &Path,
  config: &Config,
) -> Result<usize, RenderError> {
  let files: Vec<PathBuf> = WalkDir::new(input_dir)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| entry.file_type().is_file())
    .map(|entry| entry.path().to_path_buf())
    .collect();

  let failures = files
    .par_iter()
    .map(|path| {
      process_file(path, input_dir, output_dir, config).map_err(|e| {
        error!("Failed to process {}: {e}", path.display());
      })
    })
    .filter(Result::is_err)
    .count();

  info!(
    "Processed {} files, {failures} failures",
    files.len() - failures
  );
  Ok(failures)
}

fn process_file(
  path: &Path,
  input_dir: &Path,
  output_dir: &Path,
  config: &Config,
) -> Result<(), RenderError> {
  let relative = path.strip_prefix(input_dir).unwrap_or(path);
  let destination = output_dir.join(relative);
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)?;
  }

  if path.extension().is_some_and(|ext| ext == "html") {
    let pathname = pathname_for(relative);
    debug!("Transforming {} as {pathname}", path.display());
    let html = fs::read_to_string(path)?;
    let transformed = transform_document(&html, &pathname, config)?;
    fs::write(&destination, transformed)?;
  } else {
    fs::copy(path, &destination)?;
  }
  Ok(())
}

/// Map a file path relative to the site root onto the pathname a browser
/// would request. `index.html` files collapse to their directory.
#[must_use]
pub fn pathname_for(relative: &Path) -> String {
  let mut pathname = String::from("/");
  let joined = relative
    .components()
    .map(|component| component.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/");
  pathname.push_str(&joined);
  pathname
    .strip_suffix("index.html")
    .map_or(pathname.clone(), ToString::to_string)
}

/// Lift the trailing script elements out of the body into the post-body
/// region; the host framework places its bundles there.
fn extract_trailing_scripts(
  body: &NodeRef,
) -> Result<Vec<Fragment>, RenderError> {
  let mut scripts = Vec::new();
  let children: Vec<NodeRef> = body.children().collect();
  for child in children.into_iter().rev() {
    match child.data() {
      NodeData::Text(contents)
        if contents.borrow().trim().is_empty() =>
      {
        child.detach();
      },
      NodeData::Element(element)
        if element.name.local.as_ref() == "script" =>
      {
        scripts.push(element_to_fragment(&child)?);
        child.detach();
      },
      _ => break,
    }
  }
  scripts.reverse();
  Ok(scripts)
}

/// Convert a parsed element into a head-assembly fragment.
fn element_to_fragment(node: &NodeRef) -> Result<Fragment, RenderError> {
  let element = node
    .as_element()
    .ok_or_else(|| RenderError::Parse("expected an element".to_string()))?;

  let mut fragment = Fragment::new(element.name.local.as_ref());
  for (name, attribute) in &element.attributes.borrow().map {
    if name.local.as_ref() == FRAGMENT_KEY_ATTRIBUTE {
      fragment.key = Some(attribute.value.clone());
    } else {
      fragment
        .attributes
        .push((name.local.to_string(), attribute.value.clone()));
    }
  }

  let inner = serialize_children(node)?;
  if !inner.is_empty() {
    fragment.inner_html = Some(inner);
  }
  Ok(fragment)
}

/// Serialize the children of a node, excluding the node itself.
fn serialize_children(node: &NodeRef) -> Result<String, RenderError> {
  let mut out = Vec::new();
  for child in node.children() {
    child
      .serialize(&mut out)
      .map_err(|e| RenderError::Serialize(e.to_string()))?;
  }
  Ok(String::from_utf8(out)?)
}

/// Stitch the final document back together from the assembled regions.
fn reassemble(
  regions: &PageRegions,
  html_attributes: &[(String, String)],
  body_html: &str,
) -> String {
  let mut out = String::from("<!doctype html>\n<html");
  for (name, value) in html_attributes {
    out.push(' ');
    out.push_str(name);
    if !value.is_empty() {
      out.push_str("=\"");
      out.push_str(&html_escape::encode_double_quoted_attribute(value));
      out.push('"');
    }
  }
  out.push_str("><head>");
  for fragment in &regions.head {
    out.push_str(&fragment.to_html());
  }
  out.push_str("</head><body>");
  for fragment in &regions.pre_body {
    out.push_str(&fragment.to_html());
  }
  out.push_str(body_html);
  for fragment in &regions.post_body {
    out.push_str(&fragment.to_html());
  }
  out.push_str("</body></html>");
  out
}
