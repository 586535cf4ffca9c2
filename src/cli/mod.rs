//! CLI command handlers
//!
//! Bridges the clap argument parsing with the backup, restore and rename
//! orchestrators. Flags win over settings, settings over built-in defaults.

pub mod backup;
pub mod rename;
pub mod restore;

pub use backup::{handle_backup_command, BackupArgs};
pub use rename::{handle_rename_flows_command, RenameFlowsArgs};
pub use restore::{handle_restore_command, RestoreArgs};

use clap::Args;

use crate::cancel::CancelFlag;
use crate::config::Settings;
use crate::error::{BackupResult, ConnectBackupError};
use crate::models::InstanceHandle;
use crate::provider::{AwsSdk, ProviderOptions};

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Named credentials profile
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Region of the instance
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Id of the target instance
    #[arg(short, long, global = true, env = "CONNECT_INSTANCE_ID")]
    pub instance: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Connection settings from flags, falling back to settings
    pub fn provider_options(&self, settings: &Settings) -> ProviderOptions {
        ProviderOptions::new(
            self.profile.clone().or_else(|| settings.profile.clone()),
            self.region.clone().or_else(|| settings.region.clone()),
        )
        .with_endpoint_url(settings.endpoint_url.clone())
    }

    /// Provider binding for the resolved connection settings
    pub fn provider(&self, settings: &Settings) -> BackupResult<AwsSdk> {
        AwsSdk::connect(&self.provider_options(settings))
    }

    /// The instance a command operates on
    pub fn instance(&self) -> BackupResult<InstanceHandle> {
        self.instance
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(InstanceHandle::new)
            .ok_or_else(|| {
                ConnectBackupError::Validation(
                    "no instance given; pass --instance or set CONNECT_INSTANCE_ID".into(),
                )
            })
    }
}

/// Cancellation flag wired to SIGINT and SIGTERM
pub fn cancel_on_signals() -> BackupResult<CancelFlag> {
    CancelFlag::from_signals().map_err(|e| {
        ConnectBackupError::Config(format!("Failed to install signal handlers: {}", e))
    })
}
