//! Storage medium abstraction
//!
//! The Store and the legacy migrator only ever talk to a [`StorageBackend`];
//! the SQLite database is the production medium and an in-memory backend
//! stands in for it in unit tests.

use crate::domain::{Entry, EntryDate, Settings};
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;

/// Faults raised by a storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("schema upgrade to version {version} failed: {message}")]
    Upgrade { version: u32, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stored value: {0}")]
    Corrupt(String),

    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),

    #[error("injected fault: {0}")]
    Injected(&'static str),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Tabular storage for the two record kinds: the settings singleton and the
/// date-keyed entries.
pub trait StorageBackend: Send + Sync {
    /// The settings record, or `None` if it was never written.
    fn read_settings(&self) -> impl Future<Output = StorageResult<Option<Settings>>> + Send;

    fn write_settings(&self, settings: &Settings) -> impl Future<Output = StorageResult<()>> + Send;

    fn get_entry(
        &self,
        date: EntryDate,
    ) -> impl Future<Output = StorageResult<Option<Entry>>> + Send;

    fn list_entries(
        &self,
    ) -> impl Future<Output = StorageResult<BTreeMap<EntryDate, Entry>>> + Send;

    fn entry_count(&self) -> impl Future<Output = StorageResult<usize>> + Send;

    /// Create or replace one entry.
    fn put_entry(
        &self,
        date: EntryDate,
        entry: &Entry,
    ) -> impl Future<Output = StorageResult<()>> + Send;

    /// Remove one entry. Returns whether a row existed.
    fn remove_entry(&self, date: EntryDate) -> impl Future<Output = StorageResult<bool>> + Send;

    /// Replace the settings and the whole entries collection in a single
    /// transaction. Readers see either the old contents or the new ones.
    fn replace_all(
        &self,
        settings: &Settings,
        entries: &BTreeMap<EntryDate, Entry>,
    ) -> impl Future<Output = StorageResult<()>> + Send;
}

/// Named string values, the storage area that held the legacy journal blob.
pub trait KeyValueArea: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = StorageResult<Option<String>>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = StorageResult<()>> + Send;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = StorageResult<()>> + Send;
}
