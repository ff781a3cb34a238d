//! CLI settings loaded from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global CLI settings for sourceline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub workspace: WorkspaceSettings,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    pub default_dir: PathBuf,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./workspace"),
        }
    }
}

impl Config {
    /// Load settings from default locations
    ///
    /// Search order:
    /// 1. ./sourceline.toml (current directory)
    /// 2. ~/.config/sourceline/config.toml
    ///
    /// If no file is found, returns defaults.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("sourceline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "sourceline") {
            let user_config = dirs.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load settings from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.loaded_from = Some(path.to_path_buf());

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Workspace root: command-line override, else the configured default.
    pub fn workspace_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.workspace.default_dir.clone())
    }
}
