use std::fs;

use ampress_config::Config;
use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};

mod cli;
mod page;

use cli::{Cli, Commands};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Some(Commands::Init {
      output,
      format,
      force,
    }) => {
      // Check if file already exists and that we're not forcing overwrite
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }

      // Create parent directories if needed
      if let Some(parent) = output.parent() {
        if !parent.exists() && !parent.as_os_str().is_empty() {
          fs::create_dir_all(parent).wrap_err_with(|| {
            format!("Failed to create directory: {}", parent.display())
          })?;
          info!("Created directory: {}", parent.display());
        }
      }

      // Generate the config file
      Config::generate_default_config(format, output).wrap_err_with(|| {
        format!(
          "Failed to generate configuration file: {}",
          output.display()
        )
      })?;

      info!(
        "Configuration file created successfully. Edit it to customize your \
         AMP generation."
      );
      Ok(())
    },

    Some(Commands::Build {
      input_dir,
      output_dir,
    }) => {
      let config = Config::load(cli.config_file.as_deref())?;
      info!(
        "Transforming {} into {}",
        input_dir.display(),
        output_dir.display()
      );

      let failures = page::build_site(input_dir, output_dir, &config)
        .wrap_err("Site transformation failed")?;
      if failures > 0 {
        bail!("{failures} pages failed to transform");
      }
      Ok(())
    },

    None => bail!("No subcommand given. Run with --help for usage."),
  }
}
