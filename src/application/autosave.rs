//! Debounced writes of staged edits
//!
//! Edits are staged in memory and written to the Store once no new edit has
//! arrived for the configured delay. Each edit cancels the pending timer and
//! starts a new one; [`Autosaver::flush_now`] cancels the timer and writes
//! immediately.

use crate::application::store::{Store, StoreFault, StoreResult};
use crate::domain::{Entry, EntryDate, Settings};
use crate::infrastructure::StorageBackend;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Edits not yet written.
#[derive(Debug, Default, Clone, PartialEq)]
struct PendingChanges {
    entries: BTreeMap<EntryDate, Entry>,
    settings: Option<Settings>,
}

impl PendingChanges {
    fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.settings.is_none()
    }

    /// Put back changes a failed flush did not write. Anything staged since
    /// the flush started is newer and wins.
    fn restore(&mut self, unwritten: PendingChanges) {
        for (date, entry) in unwritten.entries {
            self.entries.entry(date).or_insert(entry);
        }
        if self.settings.is_none() {
            self.settings = unwritten.settings;
        }
    }
}

struct Inner<B> {
    store: Store<B>,
    delay: Duration,
    pending: Mutex<PendingChanges>,
    timer: Mutex<Option<CancellationToken>>,
    // Held for the whole of a write so timer and explicit flushes never overlap.
    gate: tokio::sync::Mutex<()>,
}

impl<B: StorageBackend> Inner<B> {
    async fn flush(&self) -> StoreResult<()> {
        let _gate = self.gate.lock().await;

        let batch = std::mem::take(&mut *lock(&self.pending));
        if batch.is_empty() {
            return Ok(());
        }

        let mut unwritten = PendingChanges::default();
        let mut first_fault: Option<StoreFault> = None;

        if let Some(settings) = batch.settings {
            if let Err(fault) = self.store.write_settings(&settings).await {
                unwritten.settings = Some(settings);
                first_fault.get_or_insert(fault);
            }
        }

        let total = batch.entries.len();
        for (date, entry) in batch.entries {
            if let Err(fault) = self.store.upsert_entry(date, &entry).await {
                unwritten.entries.insert(date, entry);
                first_fault.get_or_insert(fault);
            }
        }

        match first_fault {
            None => {
                debug!(entries = total, "autosave flushed");
                Ok(())
            }
            Some(fault) => {
                warn!(
                    unwritten = unwritten.entries.len(),
                    "autosave flush incomplete; changes kept for the next flush"
                );
                lock(&self.pending).restore(unwritten);
                Err(fault)
            }
        }
    }
}

/// Coalesces edits and writes them through the Store after an idle delay.
pub struct Autosaver<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for Autosaver<B> {
    fn clone(&self) -> Self {
        Autosaver {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: StorageBackend + 'static> Autosaver<B> {
    pub fn new(store: Store<B>, delay: Duration) -> Self {
        Autosaver {
            inner: Arc::new(Inner {
                store,
                delay,
                pending: Mutex::new(PendingChanges::default()),
                timer: Mutex::new(None),
                gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Stage the full contents of an entry and restart the timer.
    pub fn stage_entry(&self, date: EntryDate, entry: Entry) {
        lock(&self.inner.pending).entries.insert(date, entry);
        self.schedule();
    }

    pub fn stage_settings(&self, settings: Settings) {
        lock(&self.inner.pending).settings = Some(settings);
        self.schedule();
    }

    pub fn has_pending(&self) -> bool {
        !lock(&self.inner.pending).is_empty()
    }

    /// Whether a delayed flush is waiting to fire.
    pub fn is_scheduled(&self) -> bool {
        lock(&self.inner.timer)
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Write everything staged now, without waiting for the timer.
    pub async fn flush_now(&self) -> StoreResult<()> {
        self.cancel_timer();
        self.inner.flush().await
    }

    /// Delete an entry, dropping any staged edit for it first.
    pub async fn delete_entry(&self, date: EntryDate) -> StoreResult<()> {
        let _gate = self.inner.gate.lock().await;
        lock(&self.inner.pending).entries.remove(&date);
        self.inner.store.delete_entry(date).await
    }

    fn cancel_timer(&self) {
        if let Some(token) = lock(&self.inner.timer).take() {
            token.cancel();
        }
    }

    fn schedule(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = lock(&self.inner.timer).replace(token.clone()) {
            previous.cancel();
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(inner.delay) => {
                    token.cancel();
                    if let Err(fault) = inner.flush().await {
                        debug!(%fault, "delayed autosave failed; changes stay staged");
                    }
                }
            }
        });
    }
}
