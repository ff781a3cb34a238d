//! Per-source directories and metadata records
//!
//! Directory layout:
//! ```text
//! {workspace}/sources/
//! └── {source-id}/
//!     ├── metadata.json
//!     ├── source/          # raw upstream files
//!     └── processed/       # parser output and exports
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sourceline_core::{METADATA_FILE, PROCESSED_DIR, RAW_DIR, SourceMetadata};

/// Owns the `sources/` directory of a workspace.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    sources_dir: PathBuf,
}

impl MetadataStore {
    pub fn new(sources_dir: &Path) -> Self {
        Self {
            sources_dir: sources_dir.to_path_buf(),
        }
    }

    pub fn sources_dir(&self) -> &Path {
        &self.sources_dir
    }

    pub fn source_dir(&self, id: &str) -> PathBuf {
        self.sources_dir.join(id)
    }

    /// Create the source directory and its `source/` and `processed/` subdirectories.
    pub fn ensure_directory(&self, id: &str) -> Result<PathBuf> {
        let dir = self.source_dir(id);
        for sub in [RAW_DIR, PROCESSED_DIR] {
            let path = dir.join(sub);
            fs::create_dir_all(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
        }
        Ok(dir)
    }

    /// Load the record for `id`, writing an empty one if none exists yet.
    pub fn load_or_create(&self, id: &str) -> Result<SourceMetadata> {
        let dir = self.source_dir(id);
        if dir.join(METADATA_FILE).exists() {
            return SourceMetadata::read_from(&dir);
        }
        let metadata = SourceMetadata::default();
        metadata.write_to(&dir)?;
        log::debug!("{id}: created empty metadata");
        Ok(metadata)
    }

    /// Atomically replace the persisted record for `id`.
    pub fn persist(&self, id: &str, metadata: &SourceMetadata) -> Result<()> {
        metadata
            .write_to(&self.source_dir(id))
            .with_context(|| format!("failed to persist metadata for '{id}'"))
    }
}
