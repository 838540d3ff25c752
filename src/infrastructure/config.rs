//! Configuration management

use crate::error::{Result, TdiaryError};
use crate::infrastructure::repository::TDIARY_DIR;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Key the pre-database journal blob was stored under.
pub const DEFAULT_LEGACY_KEY: &str = "travel-diary-v1";

/// Idle time before staged edits are written.
pub const DEFAULT_AUTOSAVE_MS: u64 = 400;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "detect_default_editor")]
    pub editor: String,
    #[serde(default = "default_autosave_ms")]
    pub autosave_ms: u64,
    #[serde(default = "default_legacy_key")]
    pub legacy_key: String,
    pub created: DateTime<Utc>,
}

fn default_autosave_ms() -> u64 {
    DEFAULT_AUTOSAVE_MS
}

fn default_legacy_key() -> String {
    DEFAULT_LEGACY_KEY.to_string()
}

/// Detect default editor from environment or system
fn detect_default_editor() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        })
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Config {
            editor: detect_default_editor(),
            autosave_ms: DEFAULT_AUTOSAVE_MS,
            legacy_key: default_legacy_key(),
            created: Utc::now(),
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }

    /// Load config from .tdiary/config.toml in the given directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(TDIARY_DIR).join("config.toml");

        let contents = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TdiaryError::NotTdiaryDirectory(path.to_path_buf())
            } else {
                TdiaryError::Io(e)
            }
        })?;

        toml::from_str(&contents)
            .map_err(|e| TdiaryError::Config(format!("Failed to parse config.toml: {}", e)))
    }

    /// Save config to .tdiary/config.toml in the given directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        let metadata_dir = path.join(TDIARY_DIR);
        let config_path = metadata_dir.join("config.toml");

        if !metadata_dir.exists() {
            fs::create_dir(&metadata_dir)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| TdiaryError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the editor command, checking environment variables first
    pub fn get_editor(&self) -> String {
        std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| self.editor.clone())
    }
}
