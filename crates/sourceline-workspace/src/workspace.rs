//! Workspace: one root directory holding configuration and per-source state
//!
//! Directory layout:
//! ```text
//! {root}/
//! ├── config.json
//! └── sources/
//!     └── {source-id}/ ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sourceline_core::{ProgressContext, Registry, SourceMetadata};

use crate::active::ActiveSource;
use crate::config::WorkspaceConfiguration;
use crate::metadata::MetadataStore;
use crate::pipeline::{Pipeline, SourceReport, UsageError};
use crate::status::StatusReport;

pub const SOURCES_DIR: &str = "sources";

pub struct Workspace {
    root: PathBuf,
    configuration: WorkspaceConfiguration,
    store: MetadataStore,
    sources: Vec<ActiveSource>,
}

impl Workspace {
    /// Open (or initialize) the workspace at `root`.
    ///
    /// Fails if the root, `sources/` or the configuration cannot be set up.
    /// Data sources that fail to instantiate are left out, not fatal.
    pub fn open(root: &Path, registry: &Registry) -> Result<Self> {
        let sources_dir = root.join(SOURCES_DIR);
        fs::create_dir_all(&sources_dir)
            .with_context(|| format!("failed to create {}", sources_dir.display()))?;

        let configuration = WorkspaceConfiguration::load_or_create(root)?;
        let store = MetadataStore::new(&sources_dir);

        let sources: Vec<ActiveSource> = registry
            .resolve_active(&configuration.data_source_ids)
            .into_iter()
            .map(|source| {
                let dir = store.source_dir(source.id());
                ActiveSource::new(source, dir)
            })
            .collect();

        let missing: Vec<&str> = configuration
            .data_source_ids
            .iter()
            .filter(|id| !sources.iter().any(|a| a.id() == id.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            log::warn!("configured data sources not available: {}", missing.join(", "));
        }

        log::debug!(
            "workspace {}: {} active data source(s)",
            root.display(),
            sources.len()
        );
        Ok(Self {
            root: root.to_path_buf(),
            configuration,
            store,
            sources,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn configuration(&self) -> &WorkspaceConfiguration {
        &self.configuration
    }

    pub fn sources_dir(&self) -> &Path {
        self.store.sources_dir()
    }

    pub fn sources(&self) -> &[ActiveSource] {
        &self.sources
    }

    /// Ensure every source has its directory and an in-memory metadata record.
    ///
    /// Failures are logged per source; that source keeps an empty record and
    /// its later stages are still attempted.
    pub fn prepare_sources(&mut self) {
        for active in &mut self.sources {
            let id = active.source.id().to_string();
            if let Err(e) = self.store.ensure_directory(&id) {
                log::error!("failed to create data source directory for '{id}': {e:#}");
            }
            active.metadata = match self.store.load_or_create(&id) {
                Ok(metadata) => metadata,
                Err(e) => {
                    log::error!("failed to load data source metadata for '{id}': {e:#}");
                    SourceMetadata::default()
                }
            };
        }
    }

    /// Staleness of every active source. Logs the table and aggregate message.
    pub fn check_state(&mut self) -> StatusReport {
        self.prepare_sources();
        let report = StatusReport::collect(&self.sources);
        log::info!("\n{}", report.render());
        log::info!("{}", report.summary_message());
        report
    }

    /// Automatic run over all active sources.
    pub fn update_data_sources(&mut self, progress: &ProgressContext) -> Vec<SourceReport> {
        self.prepare_sources();
        Pipeline::new(&self.store, progress).run_all(&mut self.sources)
    }

    /// Manual integration of already-placed files for one source.
    pub fn integrate_data_source(
        &mut self,
        source_id: Option<&str>,
        version: Option<&str>,
        progress: &ProgressContext,
    ) -> Result<Option<SourceReport>, UsageError> {
        self.prepare_sources();
        Pipeline::new(&self.store, progress).integrate(&mut self.sources, source_id, version)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("configuration", &self.configuration)
            .field("sources", &self.sources)
            .finish()
    }
}
