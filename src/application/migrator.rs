//! One-shot migration of the legacy single-blob journal

use crate::application::store::Store;
use crate::domain::AggregateState;
use crate::infrastructure::{KeyValueArea, StorageBackend};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Why an attempt left the legacy blob for the next startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferReason {
    /// The Store could not say whether it already holds entries.
    StoreUnreadable,
    /// The key/value area could not be read.
    LegacyUnreadable,
    /// The blob is not a journal document.
    MalformedLegacy(String),
    /// The transaction writing the migrated records failed.
    WriteFailed,
}

impl fmt::Display for DeferReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferReason::StoreUnreadable => write!(f, "the journal database could not be read"),
            DeferReason::LegacyUnreadable => write!(f, "the legacy data could not be read"),
            DeferReason::MalformedLegacy(msg) => write!(f, "the legacy data is malformed ({})", msg),
            DeferReason::WriteFailed => write!(f, "writing the migrated entries failed"),
        }
    }
}

/// What a migration attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The Store already had entries; the legacy blob was not looked at.
    SkippedExistingEntries,
    NoLegacyData,
    Migrated {
        entries: usize,
        /// False when the blob could not be deleted after the commit.
        legacy_removed: bool,
    },
    /// Nothing was written; the next startup tries again.
    Deferred(DeferReason),
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOutcome::SkippedExistingEntries => {
                write!(f, "Journal already has entries; legacy data ignored")
            }
            MigrationOutcome::NoLegacyData => write!(f, "No legacy data found"),
            MigrationOutcome::Migrated {
                entries,
                legacy_removed: true,
            } => write!(f, "Migrated {} legacy entries", entries),
            MigrationOutcome::Migrated {
                entries,
                legacy_removed: false,
            } => write!(
                f,
                "Migrated {} legacy entries (legacy data could not be removed)",
                entries
            ),
            MigrationOutcome::Deferred(reason) => {
                write!(f, "Migration postponed: {}", reason)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum MigrationPhase {
    NotStarted,
    InProgress,
    Completed(MigrationOutcome),
}

/// Moves the legacy blob into the Store at most once per process.
///
/// Callers share a single attempt: whoever arrives while it runs waits for it
/// and gets the same outcome. If an attempt is abandoned mid-flight (its future
/// dropped), the next caller starts over.
pub struct LegacyMigrator<B, K> {
    store: Store<B>,
    legacy: Arc<K>,
    key: String,
    phase: Mutex<MigrationPhase>,
}

impl<B: StorageBackend, K: KeyValueArea> LegacyMigrator<B, K> {
    pub fn new(store: Store<B>, legacy: Arc<K>, key: impl Into<String>) -> Self {
        LegacyMigrator {
            store,
            legacy,
            key: key.into(),
            phase: Mutex::new(MigrationPhase::NotStarted),
        }
    }

    /// Outcome of the attempt made in this process, if one finished.
    pub async fn outcome(&self) -> Option<MigrationOutcome> {
        match &*self.phase.lock().await {
            MigrationPhase::Completed(outcome) => Some(outcome.clone()),
            _ => None,
        }
    }

    pub async fn run(&self) -> MigrationOutcome {
        let mut phase = self.phase.lock().await;

        match &*phase {
            MigrationPhase::Completed(outcome) => return outcome.clone(),
            MigrationPhase::InProgress => {
                debug!(key = %self.key, "previous migration attempt was abandoned; retrying")
            }
            MigrationPhase::NotStarted => {}
        }

        *phase = MigrationPhase::InProgress;
        let outcome = self.attempt().await;
        *phase = MigrationPhase::Completed(outcome.clone());
        outcome
    }

    async fn attempt(&self) -> MigrationOutcome {
        match self.store.count_entries().await {
            Ok(0) => {}
            Ok(count) => {
                debug!(count, "journal already has entries; skipping legacy migration");
                return MigrationOutcome::SkippedExistingEntries;
            }
            Err(_) => return self.defer(DeferReason::StoreUnreadable),
        }

        let blob = match self.legacy.get(&self.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return MigrationOutcome::NoLegacyData,
            Err(err) => {
                warn!(key = %self.key, error = %err, "could not read legacy data");
                return self.defer(DeferReason::LegacyUnreadable);
            }
        };

        let state = match AggregateState::from_json(&blob) {
            Ok(state) => state,
            Err(err) => {
                return self.defer(DeferReason::MalformedLegacy(err.to_string()));
            }
        };

        if self.store.write_state(&state).await.is_err() {
            return self.defer(DeferReason::WriteFailed);
        }

        let legacy_removed = match self.legacy.remove(&self.key).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key = %self.key, error = %err, "migrated legacy data but could not remove it");
                false
            }
        };

        info!(
            key = %self.key,
            entries = state.entries.len(),
            legacy_removed,
            "migrated legacy journal"
        );
        MigrationOutcome::Migrated {
            entries: state.entries.len(),
            legacy_removed,
        }
    }

    fn defer(&self, reason: DeferReason) -> MigrationOutcome {
        warn!(key = %self.key, %reason, "legacy migration deferred");
        MigrationOutcome::Deferred(reason)
    }
}
