//! Heading extraction for a local HTML file.

use std::path::Path;

use super::read_input;
use crate::config::Settings;

pub fn cmd_extract(settings: &Settings, file: &Path, json: bool) -> anyhow::Result<()> {
    let html = read_input(file)?;
    let structure = settings.heading_extractor().extract_html(&html);

    if json {
        println!("{}", serde_json::to_string_pretty(&structure)?);
    } else {
        println!("{}", structure);
    }
    Ok(())
}
