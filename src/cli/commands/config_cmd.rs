//! Configuration management commands.

use std::path::Path;

use console::style;

use crate::cli::icons::warn;
use crate::config::Settings;

/// Print the effective configuration (file plus environment overrides).
pub fn cmd_config_show(settings: &Settings) -> anyhow::Result<()> {
    match settings.source_path {
        Some(ref path) => eprintln!("{} {}", style("# Loaded from").dim(), path.display()),
        None => eprintln!("{}", style("# No config file found, showing defaults").dim()),
    }
    print!("{}", settings.to_toml()?);
    Ok(())
}

/// Print the config file that would be loaded.
pub fn cmd_config_path(explicit: Option<&Path>) -> anyhow::Result<()> {
    match Settings::discover(explicit) {
        Some(path) => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("{} File does not exist", warn());
            }
        }
        None => {
            eprintln!("{} No config file found (defaults in use)", warn());
        }
    }
    Ok(())
}
