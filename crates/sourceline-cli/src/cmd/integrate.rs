//! Integrate command: adopt files placed by hand under `sources/{id}/source/`

use std::path::Path;

use anyhow::Result;
use clap::Args;
use sourceline_core::{ProgressContext, Registry};
use sourceline_workspace::Workspace;

#[derive(Args, Debug)]
pub struct IntegrateArgs {
    /// Data source id
    pub source: Option<String>,
    /// Version label to record for the integrated files
    pub version: Option<String>,
}

pub fn run(
    args: IntegrateArgs,
    root: &Path,
    registry: &Registry,
    progress: &ProgressContext,
) -> Result<()> {
    let mut workspace = Workspace::open(root, registry)?;
    let outcome = workspace.integrate_data_source(
        args.source.as_deref(),
        args.version.as_deref(),
        progress,
    )?;

    match outcome {
        Some(report) => progress.println(format!("\n{}", super::render_reports(&[report]))),
        None => log::warn!(
            "'{}' is not an active data source",
            args.source.as_deref().unwrap_or_default()
        ),
    }
    Ok(())
}
