//! Journal directory layout and discovery

use crate::error::{Result, TdiaryError};
use crate::infrastructure::Config;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the metadata directory marking a journal root.
pub const TDIARY_DIR: &str = ".tdiary";

/// Environment variable pointing at a journal root.
pub const ROOT_ENV: &str = "TDIARY_ROOT";

/// Abstract access to a journal's on-disk layout
pub trait JournalRepository {
    /// Get the root directory of this journal
    fn root(&self) -> &Path;

    /// Load configuration from .tdiary/config.toml
    fn load_config(&self) -> Result<Config>;

    /// Save configuration to .tdiary/config.toml
    fn save_config(&self, config: &Config) -> Result<()>;

    /// Check if .tdiary directory exists
    fn is_initialized(&self) -> bool;

    /// Create the .tdiary directory structure
    fn initialize(&self) -> Result<()>;
}

/// File system implementation of JournalRepository
#[derive(Debug, Clone)]
pub struct FileSystemRepository {
    pub root: PathBuf,
}

impl FileSystemRepository {
    pub fn new(root: PathBuf) -> Self {
        FileSystemRepository { root }
    }

    /// Find the journal root.
    /// `TDIARY_ROOT` wins when set; otherwise walk up from the current directory.
    pub fn discover() -> Result<Self> {
        if let Ok(root_path) = std::env::var(ROOT_ENV) {
            let path = PathBuf::from(root_path);
            if Self::has_tdiary_dir(&path) {
                return Ok(FileSystemRepository::new(path));
            }
            return Err(TdiaryError::Config(format!(
                "{} is set to '{}' but no {} directory found. \
                Run 'tdiary init' in that directory or unset {}.",
                ROOT_ENV,
                path.display(),
                TDIARY_DIR,
                ROOT_ENV
            )));
        }

        let current_dir = std::env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Walk up from `start` to the nearest directory containing `.tdiary`.
    pub fn discover_from(start: &Path) -> Result<Self> {
        start
            .ancestors()
            .find(|dir| Self::has_tdiary_dir(dir))
            .map(|dir| FileSystemRepository::new(dir.to_path_buf()))
            .ok_or_else(|| TdiaryError::NotTdiaryDirectory(start.to_path_buf()))
    }

    fn has_tdiary_dir(path: &Path) -> bool {
        path.join(TDIARY_DIR).is_dir()
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join(TDIARY_DIR)
    }

    /// SQLite database holding entries and settings.
    pub fn database_path(&self) -> PathBuf {
        self.metadata_dir().join("journal.db")
    }

    /// Key/value directory that held the pre-database journal blob.
    pub fn local_storage_dir(&self) -> PathBuf {
        self.metadata_dir().join("local-storage")
    }
}

impl JournalRepository for FileSystemRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn load_config(&self) -> Result<Config> {
        Config::load_from_dir(&self.root)
    }

    fn save_config(&self, config: &Config) -> Result<()> {
        config.save_to_dir(&self.root)
    }

    fn is_initialized(&self) -> bool {
        Self::has_tdiary_dir(&self.root)
    }

    fn initialize(&self) -> Result<()> {
        let metadata_dir = self.metadata_dir();

        if metadata_dir.exists() {
            return Err(TdiaryError::Config(format!(
                "Directory already initialized: {}",
                self.root.display()
            )));
        }

        fs::create_dir(&metadata_dir)?;
        fs::create_dir(self.local_storage_dir())?;
        Ok(())
    }
}
