//! Restore CLI command

use clap::Args;

use super::{cancel_on_signals, GlobalArgs};
use crate::backup::{RestoreManager, RestoreRequest};
use crate::config::Settings;
use crate::display::format_restore_outcome;
use crate::error::BackupResult;
use crate::models::RestoreKind;
use crate::storage::{Locator, LocatorReader};

/// Arguments of `restore`
#[derive(Args, Debug, Clone)]
pub struct RestoreArgs {
    /// Kind of record to restore
    #[arg(long = "type", value_enum, value_name = "TYPE")]
    pub kind: RestoreKind,

    /// Create a new resource with this name instead of updating the original
    #[arg(long, value_name = "NAME")]
    pub create: Option<String>,

    /// Record to restore: a file path or s3://bucket/key
    pub source: String,
}

impl RestoreArgs {
    /// The restore to run; a blank `--create` counts as no new name
    pub fn request(&self, global: &GlobalArgs) -> BackupResult<RestoreRequest> {
        Ok(RestoreRequest {
            kind: self.kind.into(),
            source: Locator::parse(&self.source)?,
            instance: global.instance()?,
            new_name: self.create.clone().filter(|name| !name.trim().is_empty()),
        })
    }
}

/// Handle the restore command
pub fn handle_restore_command(
    global: &GlobalArgs,
    settings: &Settings,
    args: RestoreArgs,
) -> BackupResult<()> {
    let request = args.request(global)?;

    let provider = global.provider(settings)?;
    let manager = RestoreManager::new(&provider, LocatorReader::new(&provider), cancel_on_signals()?);
    let outcome = manager.restore(&request)?;

    println!("{}", format_restore_outcome(&outcome));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceKind;

    fn global() -> GlobalArgs {
        GlobalArgs {
            instance: Some("abc123".into()),
            ..GlobalArgs::default()
        }
    }

    fn args(create: Option<&str>) -> RestoreArgs {
        RestoreArgs {
            kind: RestoreKind::Flow,
            create: create.map(str::to_string),
            source: "abc123/flows/Welcome.json".into(),
        }
    }

    #[test]
    fn test_blank_new_name_updates_in_place() {
        assert_eq!(args(Some("")).request(&global()).unwrap().new_name, None);
        assert_eq!(args(Some("  ")).request(&global()).unwrap().new_name, None);
        assert_eq!(args(None).request(&global()).unwrap().new_name, None);
    }

    #[test]
    fn test_new_name_selects_create() {
        let request = args(Some("Welcome copy")).request(&global()).unwrap();
        assert_eq!(request.new_name.as_deref(), Some("Welcome copy"));
        assert_eq!(request.kind, ResourceKind::Flow);
        assert_eq!(request.instance.id(), "abc123");
    }
}
