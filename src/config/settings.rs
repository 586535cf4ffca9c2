//! User settings for connect-backup
//!
//! Every field has a default, so a missing file and a partial file both load.
//! Command-line flags take precedence over anything set here.

use serde::{Deserialize, Serialize};

use super::paths::ConfigPaths;
use crate::backup::DEFAULT_QUEUE_TYPES;
use crate::error::{BackupResult, ConnectBackupError};
use crate::storage::write_atomic;

/// Stock flows created with every new instance
pub const DEFAULT_FLOW_NAMES: [&str; 20] = [
    "Sample inbound flow (first contact experience)",
    "Default agent hold",
    "Default customer queue",
    "Default agent whisper",
    "Import Testing",
    "Sample note for screenpop",
    "Sample AB test",
    "Default queue transfer",
    "Sample disconnect flow",
    "Sample queue configurations flow",
    "Default customer hold",
    "Default agent transfer",
    "Default outbound",
    "Sample recording behavior",
    "Sample Lambda integration",
    "Sample queue customer",
    "Sample secure input with no agent",
    "Default customer whisper",
    "Sample interruptible queue flow with callback",
    "Sample secure input with agent",
];

/// User settings for connect-backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Named credentials profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint override for every service call, e.g. a local emulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// Flows selected by `rename-flows` without `--all-flows`
    #[serde(default = "default_flow_names")]
    pub default_flow_names: Vec<String>,

    /// Also write each flow's script as a plain JSON document
    #[serde(default)]
    pub flows_raw: bool,

    /// Queue types included in a backup
    #[serde(default = "default_queue_types")]
    pub queue_types: Vec<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_flow_names() -> Vec<String> {
    DEFAULT_FLOW_NAMES.iter().map(|name| name.to_string()).collect()
}

fn default_queue_types() -> Vec<String> {
    DEFAULT_QUEUE_TYPES.iter().map(|t| t.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            profile: None,
            region: None,
            endpoint_url: None,
            default_flow_names: default_flow_names(),
            flows_raw: false,
            queue_types: default_queue_types(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &ConfigPaths) -> BackupResult<Self> {
        let settings_path = paths.config_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ConnectBackupError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents).map_err(|e| {
            ConnectBackupError::Config(format!(
                "Failed to parse settings file {}: {}",
                settings_path.display(),
                e
            ))
        })
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ConfigPaths) -> BackupResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ConnectBackupError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        write_atomic(paths.config_file(), contents.as_bytes())
    }
}
