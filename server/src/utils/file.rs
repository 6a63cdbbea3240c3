//! Path helpers

use std::path::PathBuf;

use directories::BaseDirs;

/// Expand a user-supplied path: `~` and `~/...` resolve against the home
/// directory, relative paths against the current working directory,
/// absolute paths pass through unchanged.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let home = || BaseDirs::new().map(|b| b.home_dir().to_path_buf());

    let expanded = if path == "~" {
        home().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match home() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_passes_through() {
        assert_eq!(expand_path("/etc/config"), PathBuf::from("/etc/config"));
    }

    #[test]
    fn test_relative_becomes_absolute() {
        let expanded = expand_path("data");
        assert!(expanded.is_absolute());
        assert!(expanded.ends_with("data"));
    }

    #[test]
    fn test_tilde_expansion() {
        let expanded = expand_path("~/counters");
        assert!(!expanded.to_string_lossy().starts_with('~') || BaseDirs::new().is_none());
    }
}
