use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{AyumiError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AyumiConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub journal: JournalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Custom data location: the data directory for the file backend, the
    /// database file for the sqlite backend. Defaults under `~/.config/ayumi/`.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// How many episodes the "recent" view shows.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

/// Valid storage backend names.
pub const VALID_STORAGE_BACKENDS: &[&str] = &["file", "sqlite", "memory"];

// -- Defaults --

fn default_storage_backend() -> String {
    "file".to_string()
}
fn default_recent_limit() -> usize {
    5
}

impl AyumiConfig {
    /// Load configuration with a two-layer TOML merge:
    /// 1. ~/.config/ayumi/config.toml (global)
    /// 2. .ayumi/config.toml (project)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let project_config = dir.join(".ayumi").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        let config = builder
            .build()
            .map_err(|e| AyumiError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| AyumiError::Config(e.to_string()))?;

        cfg.validate();
        Ok(cfg)
    }

    /// Validate config values, clamping out-of-range values and logging
    /// warnings. This is lenient — it fixes values rather than rejecting
    /// the config.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !VALID_STORAGE_BACKENDS.contains(&self.storage.backend.as_str()) {
            warnings.push(format!(
                "unknown storage backend '{}', valid: {}",
                self.storage.backend,
                VALID_STORAGE_BACKENDS.join(", ")
            ));
        }

        if self.journal.recent_limit == 0 {
            warnings.push("journal.recent_limit = 0, setting to 1".to_string());
            self.journal.recent_limit = 1;
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ayumi").join("config.toml"))
}
