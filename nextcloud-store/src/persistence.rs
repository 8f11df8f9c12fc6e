//! File persistence helpers.
//!
//! Settings hold server URLs and user names, so files are written owner-only.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Directory name under the platform config dir.
const APP_DIR: &str = "nextcloud-rs";

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/nextcloud-rs`
/// - Linux: `~/.config/nextcloud-rs`
/// - Windows: `%APPDATA%\nextcloud-rs`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets owner-only permissions (0o600 for files, 0o700 for directories).
#[cfg(unix)]
async fn set_owner_only(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = %format!("{mode:o}"), "Set restrictive permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_owner_only(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Ensures a directory exists; a newly created one is owner-only.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be created.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !tokio::fs::try_exists(path).await? {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
        set_owner_only(path, 0o700).await?;
    }
    Ok(())
}

/// Saves data to a JSON file.
///
/// Creates the parent directory if needed, writes atomically (temp file +
/// rename) and restricts permissions on Unix.
///
/// # Errors
///
/// IO or serialization errors.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    set_owner_only(&temp_path, 0o600).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
///
/// # Errors
///
/// IO errors (including a missing file) or parse errors.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    Ok(data)
}

/// Loads data from a JSON file, returning the default if it is missing or
/// unreadable.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !e.is_not_found() {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_path() {
        let path = default_settings_path();
        assert!(path.ends_with("nextcloud-rs/settings.json"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("config");
        let file = dir.join("settings.json");

        save_json(&file, &serde_json::json!({})).await.unwrap();

        let file_mode = tokio::fs::metadata(&file).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "File should have 0600 permissions");
        let dir_mode = tokio::fs::metadata(&dir).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700, "Directory should have 0700 permissions");
    }
}
