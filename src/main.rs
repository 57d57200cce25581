//! rmflash - HLK-RM04 provisioning tool
//!
//! Prepares firmware images for HLK-RM04 modules and writes them to flash.
//!
//! # Workflow
//!
//! 1. `rmflash set-mac <image> <mac>` and `rmflash set-id <image>` patch the
//!    per-device fields and rename the image after its contents
//! 2. `rmflash report <image>` shows what is stored
//! 3. `rmflash write` detects the flash part on the programmer and writes the
//!    image with the external programmer tool
//!
//! Every failure maps to a stable exit code, see the `exit` module.

mod cli;
mod commands;
mod exit;

use clap::Parser;
use cli::{Cli, Commands};
use rmflash_core::config::Config;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => return exit::fail(&e),
    };

    let result = match cli.command {
        Commands::GenerateId => commands::image::cmd_generate_id(),
        Commands::Report { image } => commands::image::cmd_report(&image),
        Commands::SetId { image, id } => {
            commands::image::cmd_set_id(&config, &image, id.as_deref())
        }
        Commands::SetMac { image, mac } => commands::image::cmd_set_mac(&config, &image, &mac),
        Commands::Detect => commands::flash::cmd_detect(&config),
        Commands::Write { file, part } => {
            commands::flash::cmd_write(&config, file.as_deref(), part.as_deref())
        }
        Commands::ListParts => {
            commands::flash::cmd_list_parts();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => exit::fail(&e),
    }
}

/// Load the configuration and apply command line overrides
fn load_config(cli: &Cli) -> rmflash_core::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(tool) = &cli.tool {
        config.tool = tool.clone();
    }
    if let Some(dir) = &cli.image_dir {
        config.image_dir = dir.clone();
    }

    log::debug!("Configuration: {:?}", config);
    Ok(config)
}
