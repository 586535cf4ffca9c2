//! Backup CLI command

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};
use std::path::PathBuf;

use super::{cancel_on_signals, GlobalArgs};
use crate::backup::{BackupManager, BackupOptions};
use crate::config::Settings;
use crate::display::format_backup_report;
use crate::error::{BackupResult, ConnectBackupError};
use crate::models::InstanceSelector;
use crate::storage::{ConsoleDestination, FileDestination, Locator, ObjectStoreDestination};

/// Arguments of `backup`
#[derive(Args, Debug, Clone)]
pub struct BackupArgs {
    /// Write records below this directory (takes precedence over --s3)
    #[arg(long, value_name = "DIR")]
    pub file: Option<PathBuf>,

    /// Write records below an object-store prefix, e.g. s3://bucket/backups
    #[arg(long, value_name = "URL", env = "S3_DEST_URL")]
    pub s3: Option<String>,

    /// Also write each flow's script as a plain JSON document
    #[arg(
        long,
        env = "FLOWS_RAW",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub flows_raw: bool,

    /// Only back up the flow with this name
    #[arg(long, value_name = "NAME")]
    pub flow: Option<String>,

    /// Back up every instance visible to the credentials
    #[arg(long)]
    pub all_instances: bool,
}

impl BackupArgs {
    /// Where records go; the console when no destination is given
    pub fn destination(&self) -> BackupResult<Locator> {
        if let Some(dir) = &self.file {
            return Ok(Locator::File(dir.clone()));
        }
        match self.s3.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => match Locator::parse(url)? {
                locator @ Locator::ObjectStore { .. } => Ok(locator),
                _ => Err(ConnectBackupError::Config(format!(
                    "--s3 expects an s3:// URL, got {}",
                    url
                ))),
            },
            None => Ok(Locator::Console),
        }
    }
}

/// Handle the backup command
pub fn handle_backup_command(
    global: &GlobalArgs,
    settings: &Settings,
    args: BackupArgs,
) -> BackupResult<()> {
    let selector = if args.all_instances {
        InstanceSelector::All
    } else {
        InstanceSelector::Single(global.instance()?)
    };
    let destination = args.destination()?;

    let provider = global.provider(settings)?;
    let options = BackupOptions {
        flows_raw: args.flows_raw || settings.flows_raw,
        flow_name: args.flow,
        queue_types: settings.queue_types.clone(),
    };
    let manager = BackupManager::new(&provider, options, cancel_on_signals()?);

    let report = match destination {
        Locator::File(root) => manager.run(&selector, &mut FileDestination::new(root))?,
        Locator::ObjectStore { bucket, key } => manager.run(
            &selector,
            &mut ObjectStoreDestination::new(&provider, bucket, key),
        )?,
        Locator::Console => manager.run(&selector, &mut ConsoleDestination::stdout())?,
    };

    eprintln!("{}", format_backup_report(&report));
    report.into_result()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> BackupArgs {
        BackupArgs {
            file: None,
            s3: None,
            flows_raw: false,
            flow: None,
            all_instances: false,
        }
    }

    #[test]
    fn test_destination_defaults_to_console() {
        assert_eq!(args().destination().unwrap(), Locator::Console);
    }

    #[test]
    fn test_file_wins_over_object_store() {
        let args = BackupArgs {
            file: Some(PathBuf::from("/tmp/backup")),
            s3: Some("s3://bucket/prefix".into()),
            ..args()
        };
        assert_eq!(
            args.destination().unwrap(),
            Locator::File(PathBuf::from("/tmp/backup"))
        );
    }

    #[test]
    fn test_object_store_destination() {
        let args = BackupArgs {
            s3: Some("s3://bucket/connect".into()),
            ..args()
        };
        assert_eq!(
            args.destination().unwrap(),
            Locator::ObjectStore {
                bucket: "bucket".into(),
                key: "connect".into()
            }
        );

        let args = BackupArgs {
            s3: Some("/not/a/url".into()),
            ..self::args()
        };
        assert!(matches!(args.destination(), Err(ConnectBackupError::Config(_))));
    }

    #[derive(clap::Parser)]
    struct Harness {
        #[command(flatten)]
        backup: BackupArgs,
    }

    fn parse(argv: &[&str]) -> BackupArgs {
        use clap::Parser;
        Harness::try_parse_from(std::iter::once("backup").chain(argv.iter().copied()))
            .unwrap()
            .backup
    }

    #[test]
    fn test_flows_raw_accepts_boolish_values() {
        assert!(parse(&["--flows-raw"]).flows_raw);
        assert!(parse(&["--flows-raw=1"]).flows_raw);
        assert!(parse(&["--flows-raw=t"]).flows_raw);
        assert!(parse(&["--flows-raw=yes"]).flows_raw);
        assert!(!parse(&["--flows-raw=0"]).flows_raw);
        assert!(!parse(&["--flows-raw=false"]).flows_raw);
        assert!(!parse(&[]).flows_raw);
    }
}
