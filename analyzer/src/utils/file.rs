//! File utility functions

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Path argument that stands for standard input
pub const STDIN_PATH: &str = "-";

/// Expand `~` / `~/...` to the home directory and make relative paths
/// absolute against the current directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Read an input dataset from `path`, or from stdin when `path` is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read input from stdin")?;
        tracing::debug!(bytes = text.len(), "Read input from stdin");
        return Ok(text);
    }

    let path = expand_path(&path.to_string_lossy());
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "Read input file");
    Ok(text)
}
