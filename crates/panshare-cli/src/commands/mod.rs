//! Subcommand implementations.

pub mod ls;
pub mod serve;
pub mod url;

/// Normalize a user-supplied namespace path to start with `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{trimmed}")
}
