//! Data source collaborator contracts
//!
//! A data source bundles an identifier with four roles: updater, parser and
//! two exporters. The orchestrator is written once against these traits.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::metadata::SourceMetadata;

/// Subdirectory for raw upstream files.
pub const RAW_DIR: &str = "source";
/// Subdirectory for parser output and exports.
pub const PROCESSED_DIR: &str = "processed";

/// What a collaborator sees of its source while a stage runs.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    pub id: &'a str,
    /// The source's own directory, `{workspace}/sources/{id}`.
    pub dir: &'a Path,
    pub metadata: &'a SourceMetadata,
}

impl SourceContext<'_> {
    pub fn raw_dir(&self) -> PathBuf {
        self.dir.join(RAW_DIR)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.dir.join(PROCESSED_DIR)
    }
}

/// Result of an automatic update attempt.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// New upstream data was downloaded; carries the refreshed record.
    Updated(SourceMetadata),
    /// The integrated version is already the newest one.
    UpToDate,
    /// Upstream cannot be fetched automatically.
    ManualOnly(String),
    Failed(SourceError),
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated(meta) => {
                write!(f, "updated to {}", meta.version.as_deref().unwrap_or("-"))
            }
            Self::UpToDate => f.write_str("already up-to-date"),
            Self::ManualOnly(reason) => write!(f, "manual only ({reason})"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

pub trait Updater {
    /// Latest version string observable upstream.
    fn newest_version(&self) -> Result<String, SourceError>;

    /// Fetch the newest upstream data into the raw directory.
    fn update(&self, ctx: &SourceContext<'_>) -> UpdateOutcome;

    /// Adopt files the user already placed in the raw directory as `version`.
    fn integrate(&self, ctx: &SourceContext<'_>, version: &str)
        -> Result<SourceMetadata, SourceError>;
}

pub trait Parser {
    /// Transform raw files into the normalized representation.
    fn parse(&self, ctx: &SourceContext<'_>) -> Result<(), SourceError>;
}

pub trait Exporter {
    /// Short format label used in logs, e.g. "rdf".
    fn format(&self) -> &str;

    /// Serialize the normalized representation. Failure is `false`, never an error.
    fn export(&self, ctx: &SourceContext<'_>) -> bool;
}

/// One pluggable upstream dataset.
///
/// `id` must be stable: the same implementation always reports the same id.
pub trait DataSource {
    fn id(&self) -> &str;
    fn updater(&self) -> &dyn Updater;
    fn parser(&self) -> &dyn Parser;
    fn rdf_exporter(&self) -> &dyn Exporter;
    fn graph_exporter(&self) -> &dyn Exporter;
}
