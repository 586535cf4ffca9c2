//! Rename-flows CLI command

use clap::Args;

use super::{cancel_on_signals, GlobalArgs};
use crate::backup::{FlowRenamer, DEFAULT_PREFIX};
use crate::config::Settings;
use crate::display::format_rename_report;
use crate::error::BackupResult;

/// Arguments of `rename-flows`
#[derive(Args, Debug, Clone)]
pub struct RenameFlowsArgs {
    /// Prefix put in front of each selected flow name
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Rename every flow, not just the stock sample flows
    #[arg(long)]
    pub all_flows: bool,
}

/// Handle the rename-flows command
pub fn handle_rename_flows_command(
    global: &GlobalArgs,
    settings: &Settings,
    args: RenameFlowsArgs,
) -> BackupResult<()> {
    let instance = global.instance()?;
    let provider = global.provider(settings)?;
    let renamer = FlowRenamer::new(
        &provider,
        settings.default_flow_names.iter().cloned(),
        cancel_on_signals()?,
    );

    let report = renamer.rename(&instance, &args.prefix, args.all_flows)?;
    println!("{}", format_rename_report(&report));
    Ok(())
}
