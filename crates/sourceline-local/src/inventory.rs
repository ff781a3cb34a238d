//! File inventory: the normalized representation of a local source

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sourceline_core::{Parser, SourceContext, SourceError};

use crate::hash;

pub const INVENTORY_FILE: &str = "inventory.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFile {
    /// Path relative to the raw directory.
    pub name: String,
    pub size: u64,
    pub blake3: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub source: String,
    pub version: Option<String>,
    /// Combined hash of all file hashes, in listing order.
    pub content_hash: String,
    pub files: Vec<InventoryFile>,
}

impl Inventory {
    /// Hash every file recorded in the source's metadata.
    pub fn build(ctx: &SourceContext<'_>) -> Result<Self, SourceError> {
        let raw = ctx.raw_dir();
        let mut files = Vec::with_capacity(ctx.metadata.source_file_names.len());
        let mut hashes = Vec::with_capacity(files.capacity());

        for name in &ctx.metadata.source_file_names {
            let path = raw.join(name);
            if !path.is_file() {
                return Err(SourceError::Data(format!(
                    "recorded file missing: {}",
                    path.display()
                )));
            }
            let h = hash::hash_file(&path)?;
            files.push(InventoryFile {
                name: name.clone(),
                size: fs::metadata(&path)?.len(),
                blake3: h.to_hex().to_string(),
            });
            hashes.push(h);
        }

        Ok(Self {
            source: ctx.id.to_string(),
            version: ctx.metadata.version.clone(),
            content_hash: hash::combine_hashes(&hashes).to_hex().to_string(),
            files,
        })
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(INVENTORY_FILE)
    }

    pub fn write_to(&self, dir: &Path) -> Result<(), SourceError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SourceError::Data(format!("failed to serialize inventory: {e}")))?;
        fs::write(Self::path_in(dir), json)?;
        Ok(())
    }

    pub fn read_from(dir: &Path) -> Result<Self, SourceError> {
        let json = fs::read_to_string(Self::path_in(dir))?;
        serde_json::from_str(&json)
            .map_err(|e| SourceError::Data(format!("corrupt {INVENTORY_FILE}: {e}")))
    }
}

/// Parser writing `processed/inventory.json`.
#[derive(Debug, Default)]
pub struct InventoryParser;

impl Parser for InventoryParser {
    fn parse(&self, ctx: &SourceContext<'_>) -> Result<(), SourceError> {
        if ctx.metadata.source_file_names.is_empty() {
            return Err(SourceError::Data(format!(
                "'{}' has no integrated files yet",
                ctx.id
            )));
        }
        let inventory = Inventory::build(ctx)?;
        inventory.write_to(&ctx.processed_dir())?;
        log::debug!(
            "{}: inventory of {} file(s), content {}",
            ctx.id,
            inventory.files.len(),
            &inventory.content_hash[..8]
        );
        Ok(())
    }
}
