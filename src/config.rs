//! Configuration handling for the TUI

use anyhow::{Context, Result};
use directories::ProjectDirs;
use form_store::{Externals, FieldGroup};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "FORM_STORE_CONFIG";

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TuiConfig {
    /// Field-group descriptor replacing the built-in demo form
    pub form: Option<serde_json::Value>,
    /// Reference data handed to every validator
    pub externals: Option<Externals>,
    /// Tracing filter used when RUST_LOG is not set
    pub log_filter: Option<String>,
}

impl TuiConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("io", "form-store", "form-store-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: TuiConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Field group from the `form` key, if present
    pub fn field_group(&self) -> Result<Option<FieldGroup>> {
        self.form
            .as_ref()
            .map(|form| FieldGroup::from_json(form).context("Invalid form descriptor in config"))
            .transpose()
    }
}
