// Cache path utilities.
// Constructs filesystem paths for snapshots and the config file.

use std::path::PathBuf;

use directories::ProjectDirs;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "cache-utils")
}

/// Get the base cache directory (~/.cache/cache-utils on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the config directory (~/.config/cache-utils on Linux).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path to the snapshots directory.
pub fn snapshots_dir() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("snapshots"))
}

/// Path to a tag's default snapshot file.
pub fn snapshot_path(tag: &str) -> Option<PathBuf> {
    snapshots_dir().map(|dir| dir.join(format!("{}.json", sanitize_name(tag))))
}

/// Path to the config file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Sanitize a tag for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("users"), "users");
        assert_eq!(sanitize_name("api/users"), "api_users");
        assert_eq!(sanitize_name("mod::fn"), "mod__fn");
    }

    #[test]
    fn test_snapshot_path() {
        // Only path construction, nothing touches the filesystem.
        if let Some(path) = snapshot_path("api/users") {
            assert!(path.ends_with("snapshots/api_users.json"));
        }
        if let Some(path) = config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
