//! Initialize journal use case

use crate::error::{Result, TdiaryError};
use crate::infrastructure::{Config, FileSystemRepository, JournalRepository, SqliteBackend};
use std::fs;
use std::path::Path;
use tracing::info;

/// Initialize a new journal at the specified path: metadata directory,
/// config file and an up-to-date database.
pub async fn init(path: &Path) -> Result<FileSystemRepository> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }

    let repo = FileSystemRepository::new(path.to_path_buf());
    repo.initialize()?;
    repo.save_config(&Config::new())?;

    let backend = SqliteBackend::open(&repo.database_path())
        .await
        .map_err(|e| TdiaryError::Database(e.to_string()))?;
    backend.close().await;

    info!(root = %path.display(), "initialized journal");
    Ok(repo)
}
