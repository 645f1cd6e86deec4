//! Input parsing helpers.

use std::path::{Path, PathBuf};

/// Split pasted text into URLs: one per line, trimmed, skipping blank lines
/// and `#` comments. Order is preserved and duplicates are kept.
pub fn parse_url_list(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Expand a leading `~` in a configured path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
