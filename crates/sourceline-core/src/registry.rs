//! Registry of known data source implementations
//!
//! An append-only list of `(id, factory)` descriptors, filled at startup.
//! Resolution instantiates every descriptor in registration order and keeps
//! those enabled in the workspace configuration.

use std::collections::BTreeSet;

use crate::error::SourceError;
use crate::source::DataSource;

/// Builds a fresh data source instance.
pub type SourceFactory =
    Box<dyn Fn() -> Result<Box<dyn DataSource>, SourceError> + Send + Sync>;

/// A registered data source implementation.
pub struct Descriptor {
    id: String,
    factory: SourceFactory,
}

impl Descriptor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn instantiate(&self) -> Result<Box<dyn DataSource>, SourceError> {
        (self.factory)()
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor").field("id", &self.id).finish()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation. Duplicate ids are kept as-is.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Box<dyn DataSource>, SourceError> + Send + Sync + 'static,
    {
        self.descriptors.push(Descriptor {
            id: id.into(),
            factory: Box::new(factory),
        });
        self
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Instantiate every descriptor and keep those whose id is active.
    ///
    /// Instantiation failures are logged and skipped. An instance reporting an
    /// id different from its descriptor is treated as a failed instantiation.
    pub fn resolve_active(&self, active: &BTreeSet<String>) -> Vec<Box<dyn DataSource>> {
        let mut sources = Vec::new();
        for descriptor in &self.descriptors {
            let source = match descriptor.instantiate() {
                Ok(source) => source,
                Err(e) => {
                    log::error!("failed to instantiate data source '{}': {e}", descriptor.id);
                    continue;
                }
            };
            if source.id() != descriptor.id {
                log::error!(
                    "data source registered as '{}' reports id '{}', skipping",
                    descriptor.id,
                    source.id()
                );
                continue;
            }
            if active.contains(source.id()) {
                sources.push(source);
            } else {
                log::debug!("data source '{}' not enabled", descriptor.id);
            }
        }
        sources
    }
}
