//! Status command: staleness of every active source

use std::path::Path;

use anyhow::{Result, bail};
use clap::Args;
use sourceline_core::Registry;
use sourceline_workspace::Workspace;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Exit with an error when any source is behind its upstream
    #[arg(long)]
    pub check: bool,
}

pub fn run(args: StatusArgs, root: &Path, registry: &Registry) -> Result<()> {
    let mut workspace = Workspace::open(root, registry)?;
    let report = workspace.check_state();

    if args.check && !report.all_up_to_date() {
        bail!(
            "{} of {} data source(s) are stale",
            report.rows.len() - report.count_up_to_date(),
            report.rows.len()
        );
    }
    Ok(())
}
