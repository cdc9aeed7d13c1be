//! Config command - inspect the effective configuration

use anstream::println;
use release_bot::config::{ReleaseConfig, default_config_paths};
use release_bot::error::Result;
use std::path::Path;

use super::style::Stylize;

/// What the config command prints
#[derive(Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Effective configuration as TOML
    Show,
    /// Config file lookup order
    Path,
}

/// Run the config command
pub fn run_config(command: ConfigCommand, config_path: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let (config, loaded_from) = ReleaseConfig::load(config_path)?;
            match loaded_from {
                Some(path) => println!("{}", format!("# loaded from {}", path.display()).muted()),
                None => println!("{}", "# no config file found, showing defaults".muted()),
            }
            println!("{}", config.to_toml_string()?);
        }
        ConfigCommand::Path => {
            if let Some(path) = config_path {
                println!("{}", path.display());
                return Ok(());
            }
            for path in default_config_paths() {
                let marker = if path.is_file() { "found" } else { "missing" };
                println!("{} {}", path.display(), format!("({marker})").muted());
            }
        }
    }
    Ok(())
}
