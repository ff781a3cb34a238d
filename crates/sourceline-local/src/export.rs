//! Exporters for the file inventory: N-Triples and a JSON property graph

use std::fmt::Write as _;
use std::fs;

use sourceline_core::{Exporter, SourceContext};

use crate::inventory::Inventory;

pub const RDF_FILE: &str = "inventory.nt";
pub const GRAPH_FILE: &str = "inventory.graph.json";

const DCT: &str = "http://purl.org/dc/terms/";

/// Percent-encode everything outside RFC 3986 unreserved characters and `/`.
fn iri_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'/') {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

/// Escape a string for an N-Triples literal.
fn literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn to_ntriples(inv: &Inventory) -> String {
    let source_iri = format!("<urn:sourceline:{}>", iri_segment(&inv.source));
    let mut out = String::new();
    if let Some(version) = &inv.version {
        let _ = writeln!(out, "{source_iri} <{DCT}hasVersion> {} .", literal(version));
    }
    let _ = writeln!(
        out,
        "{source_iri} <{DCT}identifier> {} .",
        literal(&format!("blake3:{}", inv.content_hash))
    );
    for file in &inv.files {
        let file_iri = format!(
            "<urn:sourceline:{}/{}>",
            iri_segment(&inv.source),
            iri_segment(&file.name)
        );
        let _ = writeln!(out, "{file_iri} <{DCT}isPartOf> {source_iri} .");
        let _ = writeln!(out, "{file_iri} <{DCT}title> {} .", literal(&file.name));
        let _ = writeln!(
            out,
            "{file_iri} <{DCT}extent> \"{}\"^^<http://www.w3.org/2001/XMLSchema#long> .",
            file.size
        );
        let _ = writeln!(
            out,
            "{file_iri} <{DCT}identifier> {} .",
            literal(&format!("blake3:{}", file.blake3))
        );
    }
    out
}

pub fn to_graph(inv: &Inventory) -> serde_json::Value {
    let source_node = format!("source:{}", inv.source);
    let mut nodes = vec![serde_json::json!({
        "id": source_node,
        "label": "DataSource",
        "properties": {
            "name": inv.source,
            "version": inv.version,
            "content_hash": inv.content_hash,
        },
    })];
    let mut edges = Vec::with_capacity(inv.files.len());
    for file in &inv.files {
        let file_node = format!("file:{}", file.name);
        nodes.push(serde_json::json!({
            "id": file_node,
            "label": "File",
            "properties": {
                "name": file.name,
                "size": file.size,
                "blake3": file.blake3,
            },
        }));
        edges.push(serde_json::json!({
            "from": source_node,
            "to": file_node,
            "label": "contains",
        }));
    }
    serde_json::json!({ "nodes": nodes, "edges": edges })
}

/// Load the inventory for export, logging why it is unusable.
fn load(ctx: &SourceContext<'_>, format: &str) -> Option<Inventory> {
    match Inventory::read_from(&ctx.processed_dir()) {
        Ok(inv) => Some(inv),
        Err(e) => {
            log::warn!("{}: {format} export has no inventory to read: {e}", ctx.id);
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct RdfExporter;

impl Exporter for RdfExporter {
    fn format(&self) -> &str {
        "rdf"
    }

    fn export(&self, ctx: &SourceContext<'_>) -> bool {
        let Some(inv) = load(ctx, self.format()) else {
            return false;
        };
        let path = ctx.processed_dir().join(RDF_FILE);
        match fs::write(&path, to_ntriples(&inv)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}: failed to write {}: {e}", ctx.id, path.display());
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct GraphExporter;

impl Exporter for GraphExporter {
    fn format(&self) -> &str {
        "graph"
    }

    fn export(&self, ctx: &SourceContext<'_>) -> bool {
        let Some(inv) = load(ctx, self.format()) else {
            return false;
        };
        let path = ctx.processed_dir().join(GRAPH_FILE);
        let written = serde_json::to_string_pretty(&to_graph(&inv))
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(&path, json));
        match written {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}: failed to write {}: {e}", ctx.id, path.display());
                false
            }
        }
    }
}
