//! Block-page check for a local file.

use std::path::Path;

use crate::cli::icons::{success, warn};
use crate::config::Settings;

use super::read_input;

/// Exits with status 1 when the page is a block page.
pub fn cmd_check(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let body = read_input(file)?;
    match settings.block_detector().find_marker(&body) {
        Some(marker) => {
            println!("{} Blocked (marker: '{}')", warn(), marker);
            std::process::exit(1);
        }
        None => {
            println!("{} No block markers found", success());
            Ok(())
        }
    }
}
