//! Workspace configuration: which data sources are active

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name of the configuration artifact at the workspace root.
pub const CONFIG_FILE: &str = "config.json";

/// Workspace layout version written into new configurations.
pub const WORKSPACE_VERSION: u32 = 1;

/// Persisted workspace configuration.
///
/// Written once when the workspace is created; edited by hand afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfiguration {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Ids of the data sources to process. Sorted, no duplicates.
    #[serde(default)]
    pub data_source_ids: BTreeSet<String>,
}

fn default_version() -> u32 {
    WORKSPACE_VERSION
}

impl Default for WorkspaceConfiguration {
    fn default() -> Self {
        Self {
            version: WORKSPACE_VERSION,
            data_source_ids: BTreeSet::new(),
        }
    }
}

impl WorkspaceConfiguration {
    /// Load `{root}/config.json`, or write and return the default if absent.
    pub fn load_or_create(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.exists() {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config: Self = serde_json::from_str(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            if config.version != WORKSPACE_VERSION {
                log::warn!(
                    "{}: workspace version {} != current {WORKSPACE_VERSION}",
                    path.display(),
                    config.version
                );
            }
            return Ok(config);
        }

        let config = Self::default();
        let json =
            serde_json::to_string_pretty(&config).context("failed to serialize configuration")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("created default configuration at {}", path.display());
        Ok(config)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.data_source_ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfiguration::load_or_create(dir.path()).unwrap();
        assert_eq!(config, WorkspaceConfiguration::default());
        assert!(config.data_source_ids.is_empty());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn default_artifact_is_pretty_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        WorkspaceConfiguration::load_or_create(dir.path()).unwrap();
        let json = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(json, "{\n  \"version\": 1,\n  \"data_source_ids\": []\n}");
    }

    #[test]
    fn loads_existing_and_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"version":1,"data_source_ids":["B","A","B"]}"#,
        )
        .unwrap();

        let config = WorkspaceConfiguration::load_or_create(dir.path()).unwrap();
        let ids: Vec<_> = config.data_source_ids.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(config.is_active("A"));
        assert!(!config.is_active("C"));
    }

    #[test]
    fn existing_file_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{"data_source_ids":["X"]}"#;
        std::fs::write(dir.path().join(CONFIG_FILE), raw).unwrap();

        let config = WorkspaceConfiguration::load_or_create(dir.path()).unwrap();
        assert_eq!(config.version, WORKSPACE_VERSION);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(),
            raw
        );
    }

    #[test]
    fn corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), b"{ not json").unwrap();
        assert!(WorkspaceConfiguration::load_or_create(dir.path()).is_err());
    }

    #[test]
    fn unwritable_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(WorkspaceConfiguration::load_or_create(&missing).is_err());
    }
}
