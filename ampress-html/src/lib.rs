//! AMP HTML transformation.
//!
//! This crate turns ordinary page markup into valid AMP markup: it
//! classifies pathnames as AMP or canonical, rewrites body elements into
//! their AMP custom-element equivalents, and assembles the AMP head with
//! the runtime, boilerplate, consolidated styles and component scripts.
//! Canonical pages are left untouched apart from an optional amphtml
//! discovery link.

pub mod error;
pub mod fragment;
pub mod head;
pub mod policy;
pub mod rewrite;
pub mod utils;

pub use error::RenderError;
pub use fragment::{Fragment, PageRegions};
pub use head::{BodySetup, pre_render, render_body_setup};
pub use policy::{Classification, classify, should_emit_discovery_link};
pub use rewrite::{RewriteOutput, rewrite_body, rewrite_tree};
