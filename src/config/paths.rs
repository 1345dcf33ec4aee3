//! Cross-platform directory path resolution
//!
//! Provides functions to resolve platform-appropriate paths for configuration
//! and data directories.
//! - Linux/macOS: XDG Base Directory specification (~/.config, ~/.local/share)
//! - Windows: Known Folder API (AppData\Roaming, AppData\Local)

use std::path::{Path, PathBuf};

use super::defaults::DATABASE_FILE;

const APP_NAME: &str = "kubegraph";

/// Get the configuration directory path
///
/// Checks KUBEGRAPH_CONFIG_DIR environment variable first, then falls back to:
/// - Unix (Linux/macOS): XDG_CONFIG_HOME/kubegraph or ~/.config/kubegraph
/// - Windows: %APPDATA%\kubegraph\config
pub fn config_dir() -> PathBuf {
    std::env::var("KUBEGRAPH_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_NAME)
                    .map(|dirs| dirs.config_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".config"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".config"))
                    })
                    .join(APP_NAME)
            }
        })
}

/// Get the data directory path
///
/// Checks KUBEGRAPH_DATA_DIR environment variable first, then falls back to:
/// - Unix (Linux/macOS): XDG_DATA_HOME/kubegraph or ~/.local/share/kubegraph
/// - Windows: %LOCALAPPDATA%\kubegraph\data
pub fn data_dir() -> PathBuf {
    std::env::var("KUBEGRAPH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_NAME)
                    .map(|dirs| dirs.data_dir().to_path_buf())
                    .unwrap_or_else(|| {
                        PathBuf::from(".")
                            .join(".local")
                            .join("share")
                            .join(APP_NAME)
                    })
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_DATA_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".local").join("share"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".local").join("share"))
                    })
                    .join(APP_NAME)
            }
        })
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Database file used when `databasePath` is unset
pub fn default_database_path() -> PathBuf {
    data_dir().join(DATABASE_FILE)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
