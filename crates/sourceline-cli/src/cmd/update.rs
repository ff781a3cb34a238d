//! Update command: automatic run over all active sources

use std::path::Path;

use anyhow::Result;
use sourceline_core::{ProgressContext, Registry};
use sourceline_workspace::Workspace;
use sourceline_workspace::config::CONFIG_FILE;

pub fn run(root: &Path, registry: &Registry, progress: &ProgressContext) -> Result<()> {
    let mut workspace = Workspace::open(root, registry)?;
    if workspace.sources().is_empty() {
        log::warn!(
            "no active data sources; add ids to {}",
            workspace.root().join(CONFIG_FILE).display()
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let reports = workspace.update_data_sources(progress);
    let clean = reports.iter().filter(|r| r.all_succeeded()).count();

    progress.println(format!("\n{}", super::render_reports(&reports)));
    log::info!(
        "{clean}/{} data source(s) processed without failures in {:.1}s",
        reports.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
