//! Sourceline Core - contracts shared by the workspace and data sources
//!
//! Defines what a pluggable data source looks like (updater, parser,
//! two exporters), the per-source metadata record, the registry that
//! resolves active sources, and logging/progress plumbing.

pub mod error;
pub mod logging;
pub mod metadata;
pub mod progress;
pub mod registry;
pub mod source;

pub use error::SourceError;
pub use logging::init_logging;
pub use metadata::{METADATA_FILE, SourceMetadata};
pub use progress::ProgressContext;
pub use registry::{Descriptor, Registry, SourceFactory};
pub use source::{
    DataSource, Exporter, PROCESSED_DIR, Parser, RAW_DIR, SourceContext, UpdateOutcome, Updater,
};
