//! Editor configuration.

use crate::export::ExportConfig;
use crate::geometry::{Orientation, PageFormat};
use crate::history::MAX_HISTORY_DEPTH;
use crate::theme::DEFAULT_THEME_ID;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// User-level editor settings. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum undo snapshots kept per document.
    pub history_depth: usize,
    pub default_format: PageFormat,
    pub default_orientation: Orientation,
    pub default_theme: String,
    pub export: ExportConfig,
    /// Where layouts and history are stored; the platform data directory
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: MAX_HISTORY_DEPTH,
            default_format: PageFormat::A4,
            default_orientation: Orientation::Portrait,
            default_theme: DEFAULT_THEME_ID.to_string(),
            export: ExportConfig::default(),
            storage_dir: None,
        }
    }
}

impl EditorConfig {
    /// `<config dir>/folio/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("folio").join("config.json"))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or the defaults if it does not exist. Any other error is
    /// returned.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_depth == 0 {
            return Err(ConfigError::Invalid("historyDepth must be at least 1".to_string()));
        }
        if !(72..=1200).contains(&self.export.dpi) {
            return Err(ConfigError::Invalid(format!("export dpi {} outside 72..=1200", self.export.dpi)));
        }
        if !(self.export.quality > 0.0 && self.export.quality <= 1.0) {
            return Err(ConfigError::Invalid(format!("export quality {} outside (0, 1]", self.export.quality)));
        }
        Ok(())
    }
}
