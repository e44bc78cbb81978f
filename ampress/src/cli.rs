use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for ampress
#[derive(Parser, Debug)]
#[command(author, version, about = "ampress: AMP page generator for static sites")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to configuration file (TOML or JSON)
  #[arg(short = 'c', long = "config-file")]
  pub config_file: Option<PathBuf>,
}

impl Cli {
  /// Parse command line arguments
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

/// All supported subcommands for the ampress CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new ampress configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "ampress.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Transform a rendered site in place, page by page.
  Build {
    /// Directory containing the rendered HTML pages.
    #[arg(short, long, default_value = "public")]
    input_dir: PathBuf,

    /// Output directory for the transformed pages.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,
  },
}
