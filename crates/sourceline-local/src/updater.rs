//! Updater for hand-provided files: never automatic, integrates what is on disk

use std::path::Path;

use sourceline_core::{SourceContext, SourceError, SourceMetadata, UpdateOutcome, Updater};
use walkdir::WalkDir;

/// List regular files under `dir`, recursively, as sorted relative paths.
///
/// A missing directory lists as empty. An unreadable entry or a name that is
/// not valid UTF-8 fails the whole listing, so no file is silently left out.
pub fn list_raw_files(dir: &Path) -> Result<Vec<String>, SourceError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| SourceError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let Some(name) = relative.to_str() else {
            return Err(SourceError::Data(format!(
                "file name is not valid UTF-8: {}",
                entry.path().display()
            )));
        };
        names.push(name.to_string());
    }
    names.sort();
    Ok(names)
}

#[derive(Debug, Default)]
pub struct ManualUpdater;

impl Updater for ManualUpdater {
    fn newest_version(&self) -> Result<String, SourceError> {
        Err(SourceError::Upstream(
            "local data has no upstream; versions are set on integration".into(),
        ))
    }

    fn update(&self, _ctx: &SourceContext<'_>) -> UpdateOutcome {
        UpdateOutcome::ManualOnly("files are provided by hand".into())
    }

    fn integrate(
        &self,
        ctx: &SourceContext<'_>,
        version: &str,
    ) -> Result<SourceMetadata, SourceError> {
        let raw = ctx.raw_dir();
        let files = list_raw_files(&raw)?;
        if files.is_empty() {
            return Err(SourceError::Data(format!(
                "no files found in {}",
                raw.display()
            )));
        }
        log::info!("{}: integrating {} file(s) as {version}", ctx.id, files.len());
        Ok(SourceMetadata::new(version, files))
    }
}
