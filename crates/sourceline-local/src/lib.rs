//! sourceline-local: built-in data source for hand-provided files
//!
//! The `local` source has no upstream. Drop files into
//! `sources/local/source/` and run `sourceline integrate local <VERSION>`;
//! the parser hashes them into an inventory and the exporters write it as
//! N-Triples and as a JSON property graph.

pub mod export;
pub mod hash;
pub mod inventory;
pub mod updater;

use sourceline_core::{DataSource, Exporter, Parser, Registry, Updater};

pub use export::{GraphExporter, RdfExporter};
pub use inventory::{Inventory, InventoryParser};
pub use updater::ManualUpdater;

pub const ID: &str = "local";

#[derive(Debug, Default)]
pub struct LocalSource {
    updater: ManualUpdater,
    parser: InventoryParser,
    rdf: RdfExporter,
    graph: GraphExporter,
}

impl DataSource for LocalSource {
    fn id(&self) -> &str {
        ID
    }

    fn updater(&self) -> &dyn Updater {
        &self.updater
    }

    fn parser(&self) -> &dyn Parser {
        &self.parser
    }

    fn rdf_exporter(&self) -> &dyn Exporter {
        &self.rdf
    }

    fn graph_exporter(&self) -> &dyn Exporter {
        &self.graph
    }
}

/// Add the built-in sources of this crate to `registry`.
pub fn register(registry: &mut Registry) {
    registry.register(ID, || Ok(Box::new(LocalSource::default()) as Box<dyn DataSource>));
}
