use anyhow::Result;
use clap::{Parser, Subcommand};

use connect_backup::cli::{
    handle_backup_command, handle_rename_flows_command, handle_restore_command, BackupArgs,
    GlobalArgs, RenameFlowsArgs, RestoreArgs,
};
use connect_backup::config::{ConfigPaths, Settings};
use connect_backup::logging::init_tracing;

#[derive(Parser)]
#[command(
    name = "connect-backup",
    version,
    about = "Back up and restore the configuration of an Amazon Connect instance",
    long_about = "connect-backup saves flows, routing profiles, users, hierarchy, \
                  queues and the rest of an Amazon Connect instance's configuration \
                  as JSON documents, and restores single resources from them, \
                  either in place or as a copy under a new name."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up one or every instance to a directory, an object store or stdout
    Backup(BackupArgs),

    /// Restore a single backed-up record
    Restore(RestoreArgs),

    /// Prefix the names of the stock sample flows
    RenameFlows(RenameFlowsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let paths = ConfigPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Commands::Backup(args) => handle_backup_command(&cli.global, &settings, args)?,
        Commands::Restore(args) => handle_restore_command(&cli.global, &settings, args)?,
        Commands::RenameFlows(args) => handle_rename_flows_command(&cli.global, &settings, args)?,
    }

    Ok(())
}
