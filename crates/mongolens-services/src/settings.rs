//! Extension settings and well-known paths

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("mongolens"))
}

pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .context("Could not determine data directory")
        .map(|p| p.join("mongolens"))
}

pub fn logs_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .context("Could not determine local data directory")
        .map(|p| p.join("mongolens").join("logs"))
}

/// User settings, read from `settings.toml`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionSettings {
    /// Documents fetched when a document list is expanded
    pub default_document_limit: usize,
    /// Documents sampled when listing schema fields
    pub schema_sample_size: usize,
    /// Drops require typing the name of the dropped object
    pub confirm_drop: bool,
    pub confirm_delete_document: bool,
    pub confirm_remove_connection: bool,
    /// Open the overview page on the very first activation
    pub show_overview_on_first_run: bool,
    /// Shell started by the open-shell commands
    pub shell_command: String,
    /// Overrides the location of the persisted key/value store
    pub storage_path: Option<PathBuf>,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            default_document_limit: 10,
            schema_sample_size: 100,
            confirm_drop: true,
            confirm_delete_document: true,
            confirm_remove_connection: true,
            show_overview_on_first_run: true,
            shell_command: "mongosh".to_string(),
            storage_path: None,
        }
    }
}

impl ExtensionSettings {
    pub fn settings_path() -> Result<PathBuf> {
        config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = ?path, "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse settings in {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Where the key/value store lives
    pub fn resolved_storage_path(&self) -> Result<PathBuf> {
        match &self.storage_path {
            Some(path) => Ok(path.clone()),
            None => data_dir().map(|p| p.join("storage.json")),
        }
    }
}
