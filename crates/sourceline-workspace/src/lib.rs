//! sourceline-workspace: persistent workspace orchestrating data sources
//!
//! Loads the workspace configuration, resolves active data sources,
//! keeps each source's metadata record, reports staleness against
//! upstream and runs the update → parse → export pipeline with
//! per-stage, per-source failure isolation.

pub mod active;
pub mod config;
pub mod metadata;
pub mod pipeline;
pub mod status;
pub mod workspace;

pub use active::ActiveSource;
pub use config::WorkspaceConfiguration;
pub use metadata::MetadataStore;
pub use pipeline::{ParseStatus, Pipeline, SourceReport, UpdateStatus, UsageError};
pub use status::{StatusReport, StatusRow};
pub use workspace::Workspace;
