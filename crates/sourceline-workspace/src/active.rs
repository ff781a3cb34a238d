//! An active data source together with its workspace state

use std::path::PathBuf;

use sourceline_core::{DataSource, SourceContext, SourceMetadata};

/// A resolved data source, its directory and its in-memory metadata.
///
/// The workspace owns one per enabled source; only the orchestrator
/// replaces `metadata`, and only after a successful update or integration.
pub struct ActiveSource {
    pub source: Box<dyn DataSource>,
    pub dir: PathBuf,
    pub metadata: SourceMetadata,
}

impl ActiveSource {
    pub fn new(source: Box<dyn DataSource>, dir: PathBuf) -> Self {
        Self {
            source,
            dir,
            metadata: SourceMetadata::default(),
        }
    }

    pub fn id(&self) -> &str {
        self.source.id()
    }

    pub fn context(&self) -> SourceContext<'_> {
        SourceContext {
            id: self.source.id(),
            dir: &self.dir,
            metadata: &self.metadata,
        }
    }
}

impl std::fmt::Debug for ActiveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSource")
            .field("id", &self.id())
            .field("dir", &self.dir)
            .field("metadata", &self.metadata)
            .finish()
    }
}
