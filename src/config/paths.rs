//! Path management for connect-backup
//!
//! ## Path Resolution Order
//!
//! 1. `CONNECT_BACKUP_CONFIG_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/connect-backup` or `~/.config/connect-backup`
//! 3. Windows: `%APPDATA%\connect-backup`

use std::path::PathBuf;

use crate::error::{BackupResult, ConnectBackupError};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "CONNECT_BACKUP_CONFIG_DIR";

const APP_DIR: &str = "connect-backup";

/// Locates the configuration directory and the files inside it
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    base_dir: PathBuf,
}

impl ConfigPaths {
    /// Resolve the configuration directory
    ///
    /// # Errors
    ///
    /// Returns an error if neither the override nor a home directory is set.
    pub fn new() -> BackupResult<Self> {
        let base_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create ConfigPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn ensure_directories(&self) -> BackupResult<()> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            ConnectBackupError::Io(format!("Failed to create config directory: {}", e))
        })
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> BackupResult<PathBuf> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                ConnectBackupError::Config("Could not determine the home directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join(APP_DIR))
}

#[cfg(windows)]
fn resolve_default_path() -> BackupResult<PathBuf> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| ConnectBackupError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join(APP_DIR))
}
