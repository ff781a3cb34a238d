//! Per-source metadata record: integrated version, produced files, update time

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File name of the metadata record inside a source directory.
pub const METADATA_FILE: &str = "metadata.json";

/// State of one data source as persisted in its own directory.
///
/// A default record means "never processed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceMetadata {
    /// Last successfully integrated upstream version.
    pub version: Option<String>,
    /// Files written by the update stage, in the order they were produced.
    pub source_file_names: Vec<String>,
    /// When this record was last written after an update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl SourceMetadata {
    pub fn new(version: impl Into<String>, source_file_names: Vec<String>) -> Self {
        Self {
            version: Some(version.into()),
            source_file_names,
            updated_at: Some(Utc::now()),
        }
    }

    /// Whether the persisted version equals `latest` byte for byte.
    pub fn matches_version(&self, latest: &str) -> bool {
        self.version.as_deref() == Some(latest)
    }

    /// Write to dir/metadata.json, replacing any previous record atomically.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let path = dir.join(METADATA_FILE);
        let tmp = dir.join(format!("{METADATA_FILE}.tmp"));
        let json = serde_json::to_string_pretty(self).context("failed to serialize metadata")?;
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path).with_context(|| {
            format!("failed to rename {} → {}", tmp.display(), path.display())
        })?;
        Ok(())
    }

    /// Read from dir/metadata.json
    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(METADATA_FILE);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
    }
}
