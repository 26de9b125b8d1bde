//! Store configuration.
//!
//! Values come from, in order of precedence: `WORKLOG_*` environment
//! variables, a TOML file, then built-in defaults.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::error::PersistError;
use crate::error::Result;
use crate::export::ExportFormat;

pub const DATA_DIR_ENV: &str = "WORKLOG_DATA_DIR";
pub const EXPORT_DIR_ENV: &str = "WORKLOG_EXPORT_DIR";

/// Where the backing store and export files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Private directory holding the backing store.
    pub data_dir: PathBuf,
    /// File name of the backing store inside `data_dir`.
    pub store_file: String,
    /// Scratch directory receiving export files.
    pub export_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_file: default_store_file(),
            export_dir: std::env::temp_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("worklog")
}

/// `<config dir>/worklog/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("worklog").join("config.toml"))
}

fn default_store_file() -> String {
    "sessions.json".to_string()
}

impl StoreConfig {
    /// Config rooted at `data_dir`, with exports in the system temp dir.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
        Self::from_toml_str(&raw)
    }

    /// Apply `WORKLOG_DATA_DIR` / `WORKLOG_EXPORT_DIR` when set.
    pub fn apply_env_overrides(&mut self) {
        self.merge_overrides(|key| std::env::var(key).ok());
    }

    pub fn merge_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(EXPORT_DIR_ENV).filter(|v| !v.is_empty()) {
            self.export_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.store_file.trim().is_empty() {
            return Err(PersistError::Config(
                "store_file must not be empty".to_string(),
            ));
        }
        if self.store_file.contains(['/', '\\']) || self.store_file == ".." {
            return Err(PersistError::Config(format!(
                "store_file must be a bare file name: {}",
                self.store_file
            )));
        }
        Ok(())
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }

    pub fn export_path(&self, format: ExportFormat) -> PathBuf {
        self.export_dir.join(format.export_file_name())
    }
}
