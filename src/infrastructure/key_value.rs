//! File-backed key/value area
//!
//! One file per key under a directory. This is where the single-blob journal
//! lived before the database schema existed.

use crate::infrastructure::backend::{KeyValueArea, StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone)]
pub struct FileKeyValueArea {
    root: PathBuf,
}

impl FileKeyValueArea {
    pub fn new(root: PathBuf) -> Self {
        FileKeyValueArea { root }
    }

    /// Keys become file names, so only a conservative character set is allowed.
    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl KeyValueArea for FileKeyValueArea {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Write through a temp file in the same directory, then rename into place.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).await?;

        let tmp_path = self
            .root
            .join(format!(".{}.tmp-{}", key, std::process::id()));
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
