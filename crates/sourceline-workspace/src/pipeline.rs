//! Per-source pipeline: update → parse → export rdf → export graph
//!
//! Every stage runs regardless of how the previous one ended, and nothing a
//! source does (error or panic) stops the other sources from being processed.

use std::fmt;
use std::path::Path;
use std::panic::{AssertUnwindSafe, catch_unwind};

use indicatif::ProgressBar;
use sourceline_core::{Exporter, ProgressContext, SourceMetadata, UpdateOutcome};

use crate::active::ActiveSource;
use crate::metadata::MetadataStore;

/// Terminal label of the update stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Updated,
    UpToDate,
    ManualOnly,
    UpdateFailed,
    Integrated,
    IntegrateFailed,
}

impl UpdateStatus {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Updated | Self::UpToDate | Self::Integrated)
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Updated => "updated",
            Self::UpToDate => "up-to-date",
            Self::ManualOnly => "manual only",
            Self::UpdateFailed => "update failed",
            Self::Integrated => "integrated",
            Self::IntegrateFailed => "integrate failed",
        };
        f.write_str(label)
    }
}

/// Terminal label of the parse stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    Parsed,
    ParseFailed,
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed => f.write_str("parsed"),
            Self::ParseFailed => f.write_str("parse failed"),
        }
    }
}

/// Outcome of every stage attempted for one source in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub id: String,
    pub update: UpdateStatus,
    pub parse: ParseStatus,
    pub export_rdf: bool,
    /// `None` on the manual path, which never runs the graph export.
    pub export_graph: Option<bool>,
}

impl SourceReport {
    pub fn all_succeeded(&self) -> bool {
        self.update.is_success()
            && self.parse == ParseStatus::Parsed
            && self.export_rdf
            && self.export_graph.unwrap_or(true)
    }
}

/// Manual integration was asked for without a usable source id or version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "usage: {}", self.0)
    }
}

impl std::error::Error for UsageError {}

/// Run `f`, turning a panic into `None`.
fn guarded<T>(id: &str, stage: &str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => Some(v),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("{id}: {stage} panicked: {msg}");
            None
        }
    }
}

/// Sequential orchestrator over the active sources of a workspace.
pub struct Pipeline<'a> {
    store: &'a MetadataStore,
    progress: &'a ProgressContext,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a MetadataStore, progress: &'a ProgressContext) -> Self {
        Self { store, progress }
    }

    /// Automatic run: every source, every stage.
    pub fn run_all(&self, sources: &mut [ActiveSource]) -> Vec<SourceReport> {
        sources.iter_mut().map(|a| self.process(a)).collect()
    }

    /// Automatic run for a single source.
    pub fn process(&self, active: &mut ActiveSource) -> SourceReport {
        let id = active.id().to_string();
        log::info!("processing of data source '{id}' started");
        let pb = self.progress.source_line(&id);

        pb.set_message("update");
        let update = self.update_stage(active);
        let parse = self.parse_stage(active, &pb);

        pb.set_message("export rdf");
        let export_rdf = export_stage(active, active.source.rdf_exporter());
        pb.set_message("export graph");
        let export_graph = export_stage(active, active.source.graph_exporter());

        let report = SourceReport {
            id,
            update,
            parse,
            export_rdf,
            export_graph: Some(export_graph),
        };
        finish_line(&pb, &report);
        log::info!("processing of data source '{}' finished", report.id);
        report
    }

    /// Manual integration run for the source named `source_id`.
    ///
    /// Returns `Ok(None)` when no active source has that id.
    pub fn integrate(
        &self,
        sources: &mut [ActiveSource],
        source_id: Option<&str>,
        version: Option<&str>,
    ) -> Result<Option<SourceReport>, UsageError> {
        let (source_id, version) = match (non_blank(source_id), non_blank(version)) {
            (Some(s), Some(v)) => (s, v),
            _ => {
                let err = UsageError("integrate requires a source id and a version".to_string());
                log::error!("failed to read source name and version: {err}");
                return Err(err);
            }
        };

        let Some(active) = sources.iter_mut().find(|a| a.id() == source_id) else {
            log::debug!("no active data source '{source_id}', nothing to integrate");
            return Ok(None);
        };

        let id = active.id().to_string();
        log::info!("processing of data source '{id}' started");
        let pb = self.progress.source_line(&id);

        pb.set_message("integrate");
        let update = self.integrate_stage(active, version);
        let parse = self.parse_stage(active, &pb);
        pb.set_message("export rdf");
        let export_rdf = export_stage(active, active.source.rdf_exporter());

        let report = SourceReport {
            id,
            update,
            parse,
            export_rdf,
            export_graph: None,
        };
        finish_line(&pb, &report);
        log::info!("processing of data source '{}' finished", report.id);
        Ok(Some(report))
    }

    fn update_stage(&self, active: &mut ActiveSource) -> UpdateStatus {
        let id = active.id().to_string();
        let outcome = guarded(&id, "update", || {
            active.source.updater().update(&active.context())
        });

        if let Some(outcome) = &outcome {
            log::debug!("{id}: update returned: {outcome}");
        }
        let status = match outcome {
            Some(UpdateOutcome::Updated(metadata)) => {
                self.adopt(active, metadata, UpdateStatus::Updated)
            }
            Some(UpdateOutcome::UpToDate) => UpdateStatus::UpToDate,
            Some(UpdateOutcome::ManualOnly(reason)) => {
                let raw_dir = active.context().raw_dir();
                log::error!("{}", manual_update_hint(&id, &reason, &raw_dir));
                UpdateStatus::ManualOnly
            }
            Some(UpdateOutcome::Failed(e)) => {
                log::error!("failed to update data source '{id}': {e}");
                UpdateStatus::UpdateFailed
            }
            None => UpdateStatus::UpdateFailed,
        };
        log::info!("{id}: updated: {status}");
        status
    }

    fn integrate_stage(&self, active: &mut ActiveSource, version: &str) -> UpdateStatus {
        let id = active.id().to_string();
        let result = guarded(&id, "integrate", || {
            active.source.updater().integrate(&active.context(), version)
        });

        let status = match result {
            Some(Ok(metadata)) => self.adopt(active, metadata, UpdateStatus::Integrated),
            Some(Err(e)) => {
                log::error!("failed to integrate data source '{id}': {e}");
                UpdateStatus::IntegrateFailed
            }
            None => UpdateStatus::IntegrateFailed,
        };
        log::info!("{id}: updated manually: {status}");
        status
    }

    /// Take over a refreshed record and persist it.
    fn adopt(
        &self,
        active: &mut ActiveSource,
        mut metadata: SourceMetadata,
        success: UpdateStatus,
    ) -> UpdateStatus {
        if metadata.updated_at.is_none() {
            metadata.updated_at = Some(chrono::Utc::now());
        }
        active.metadata = metadata;
        match self.store.persist(active.id(), &active.metadata) {
            Ok(()) => success,
            Err(e) => {
                log::error!("{}: {e:#}", active.id());
                match success {
                    UpdateStatus::Integrated => UpdateStatus::IntegrateFailed,
                    _ => UpdateStatus::UpdateFailed,
                }
            }
        }
    }

    fn parse_stage(&self, active: &ActiveSource, pb: &ProgressBar) -> ParseStatus {
        pb.set_message("parse");
        let id = active.id();
        let result = guarded(id, "parse", || active.source.parser().parse(&active.context()));
        let status = match result {
            Some(Ok(())) => ParseStatus::Parsed,
            Some(Err(e)) => {
                log::error!("failed to parse data source '{id}': {e}");
                ParseStatus::ParseFailed
            }
            None => ParseStatus::ParseFailed,
        };
        log::info!("{id}: parsed: {status}");
        status
    }
}

fn export_stage(active: &ActiveSource, exporter: &dyn Exporter) -> bool {
    let id = active.id();
    let format = exporter.format().to_string();
    let exported = guarded(id, &format!("export {format}"), || {
        exporter.export(&active.context())
    })
    .unwrap_or(false);
    if exported {
        log::info!("{id}: exported {format}: true");
    } else {
        log::error!("{id}: exported {format}: false");
    }
    exported
}

fn finish_line(pb: &ProgressBar, report: &SourceReport) {
    let verdict = if report.all_succeeded() { "done" } else { "done with failures" };
    pb.finish_with_message(format!("{} / {} / {verdict}", report.update, report.parse));
}

/// Remediation for a source that cannot be fetched automatically.
fn manual_update_hint(id: &str, reason: &str, raw_dir: &Path) -> String {
    format!(
        "data source '{id}' can only be updated manually ({reason}). \
         Download the new version of {id} into {} and run \
         `sourceline integrate {id} <VERSION>` to add it to the workspace.",
        raw_dir.display()
    )
}

/// Present and not whitespace-only. The value itself is passed on as given.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
