use std::path::PathBuf;

use dirs_next::home_dir;

/// Expands a leading `~` (or `~/`, `~\`) to the user's home directory.
///
/// Paths without a tilde prefix are returned as-is after trimming.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}
