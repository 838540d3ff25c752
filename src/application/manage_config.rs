//! Config management use case

use crate::error::{Result, TdiaryError};
use crate::infrastructure::{Config, FileSystemRepository, JournalRepository};

const VALID_KEYS: &str = "editor, autosave_ms, legacy_key, created";

/// Service for managing journal configuration
pub struct ConfigService {
    repository: FileSystemRepository,
}

impl ConfigService {
    pub fn new(repository: FileSystemRepository) -> Self {
        ConfigService { repository }
    }

    /// Get a single config value
    pub fn get(&self, key: &str) -> Result<String> {
        let config = self.repository.load_config()?;

        match key {
            "editor" => Ok(config.editor),
            "autosave_ms" => Ok(config.autosave_ms.to_string()),
            "legacy_key" => Ok(config.legacy_key),
            "created" => Ok(config.created.to_rfc3339()),
            _ => Err(TdiaryError::Config(format!(
                "Unknown config key: '{}'. Valid keys are: {}",
                key, VALID_KEYS
            ))),
        }
    }

    /// Set a config value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut config = self.repository.load_config()?;

        match key {
            "editor" => {
                config.editor = value.to_string();
            }
            "autosave_ms" => {
                config.autosave_ms = value.trim().parse().map_err(|_| {
                    TdiaryError::Config(format!(
                        "Invalid autosave_ms: '{}' (expected milliseconds, e.g. 400)",
                        value
                    ))
                })?;
            }
            "legacy_key" => {
                let key = value.trim();
                if key.is_empty() {
                    return Err(TdiaryError::Config(
                        "legacy_key cannot be empty".to_string(),
                    ));
                }
                config.legacy_key = key.to_string();
            }
            "created" => {
                return Err(TdiaryError::Config(
                    "Cannot modify 'created' field (read-only)".to_string(),
                ));
            }
            _ => {
                return Err(TdiaryError::Config(format!(
                    "Unknown config key: '{}'. Valid keys are: editor, autosave_ms, legacy_key",
                    key
                )));
            }
        }

        self.repository.save_config(&config)?;
        Ok(())
    }

    /// List all config values
    pub fn list(&self) -> Result<Config> {
        self.repository.load_config()
    }
}
