//! The persistence Store
//!
//! Everything above this layer reads and writes journal data through [`Store`].
//! Storage faults stop here: they are logged and turned into a [`StoreFault`]
//! (or an absent result for reads), so no medium-specific error reaches the UI.

use crate::domain::{AggregateState, Entry, EntryDate, FontSize, Settings, Theme};
use crate::infrastructure::{StorageBackend, StorageError};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// A Store operation did not complete. The cause has already been logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("could not {operation}")]
pub struct StoreFault {
    pub operation: &'static str,
}

impl StoreFault {
    pub fn new(operation: &'static str) -> Self {
        StoreFault { operation }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreFault>;

fn fault(operation: &'static str, err: StorageError) -> StoreFault {
    error!(operation, error = %err, "storage operation failed");
    StoreFault::new(operation)
}

/// Settings and entries persistence over an injected storage backend.
pub struct Store<B> {
    backend: Arc<B>,
}

impl<B> Clone for Store<B> {
    fn clone(&self) -> Self {
        Store {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: StorageBackend> Store<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Store { backend }
    }

    /// Rebuild the aggregate view from the settings record and all entries.
    ///
    /// `None` means nothing was ever stored, or the read failed (logged).
    pub async fn read_state(&self) -> Option<AggregateState> {
        self.load_state().await.ok().flatten()
    }

    /// Like [`read_state`](Self::read_state), but a failed read is reported
    /// instead of looking like an empty Store.
    pub async fn load_state(&self) -> StoreResult<Option<AggregateState>> {
        let settings = self
            .backend
            .read_settings()
            .await
            .map_err(|e| fault("read state", e))?;
        let entries = self
            .backend
            .list_entries()
            .await
            .map_err(|e| fault("read state", e))?;

        if settings.is_none() && entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(AggregateState::new(settings.unwrap_or_default(), entries)))
    }

    /// Replace the settings and every entry with `state`.
    pub async fn write_state(&self, state: &AggregateState) -> StoreResult<()> {
        self.backend
            .replace_all(&state.settings(), &state.entries)
            .await
            .map_err(|e| fault("write state", e))
    }

    pub async fn upsert_entry(&self, date: EntryDate, entry: &Entry) -> StoreResult<()> {
        self.backend
            .put_entry(date, entry)
            .await
            .map_err(|e| fault("upsert entry", e))
    }

    /// Remove an entry. A date with no entry is already deleted.
    pub async fn delete_entry(&self, date: EntryDate) -> StoreResult<()> {
        self.backend
            .remove_entry(date)
            .await
            .map(|_| ())
            .map_err(|e| fault("delete entry", e))
    }

    /// Owned snapshot of all entries, oldest first.
    pub async fn list_entries(&self) -> StoreResult<BTreeMap<EntryDate, Entry>> {
        self.backend
            .list_entries()
            .await
            .map_err(|e| fault("list entries", e))
    }

    pub async fn get_entry(&self, date: EntryDate) -> StoreResult<Option<Entry>> {
        self.backend
            .get_entry(date)
            .await
            .map_err(|e| fault("read entry", e))
    }

    pub async fn count_entries(&self) -> StoreResult<usize> {
        self.backend
            .entry_count()
            .await
            .map_err(|e| fault("count entries", e))
    }

    /// Stored settings, or defaults when none are stored or they can't be read.
    pub async fn read_settings(&self) -> Settings {
        match self.backend.read_settings().await {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                fault("read settings", err);
                Settings::default()
            }
        }
    }

    pub async fn write_settings(&self, settings: &Settings) -> StoreResult<()> {
        self.backend
            .write_settings(settings)
            .await
            .map_err(|e| fault("write settings", e))
    }

    /// Change the theme, keeping the stored font size.
    pub async fn set_theme(&self, theme: Theme) -> StoreResult<Settings> {
        let mut settings = self.stored_settings("set theme").await?;
        settings.theme = theme;
        self.write_settings(&settings).await?;
        Ok(settings)
    }

    /// Store `raw` clamped to the allowed font size range and return what was stored.
    pub async fn set_font_size(&self, raw: i64) -> StoreResult<FontSize> {
        let mut settings = self.stored_settings("set font size").await?;
        settings.font_size = FontSize::clamped(raw);
        self.write_settings(&settings).await?;
        Ok(settings.font_size)
    }

    // A read fault must not turn into defaults that then get written back.
    async fn stored_settings(&self, operation: &'static str) -> StoreResult<Settings> {
        self.backend
            .read_settings()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| fault(operation, e))
    }
}
