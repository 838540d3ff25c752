//! Process startup and shutdown
//!
//! Opens the storage handle once, runs the legacy migration, then hands out a
//! [`Journal`] that works through the Store from then on.

use crate::application::autosave::Autosaver;
use crate::application::journal::Journal;
use crate::application::migrator::{LegacyMigrator, MigrationOutcome};
use crate::application::store::Store;
use crate::domain::EntryDate;
use crate::error::{Result, TdiaryError};
use crate::infrastructure::{
    Config, FileKeyValueArea, FileSystemRepository, JournalRepository, KeyValueArea,
    SqliteBackend, StorageBackend,
};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TDIARY_LOG";

const DEFAULT_LOG_FILTER: &str = "tdiary=warn";

/// Install the global subscriber. Logs go to stderr so command output stays clean.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Everything a command needs once storage is open and migrated.
pub struct Session<B, K> {
    pub config: Config,
    pub journal: Journal<B>,
    backend: Arc<B>,
    migrator: LegacyMigrator<B, K>,
}

impl<B, K> Session<B, K>
where
    B: StorageBackend + 'static,
    K: KeyValueArea,
{
    /// Wire the Store, migrator, autosaver and journal over the given media.
    /// The migration runs before the journal is loaded.
    pub async fn assemble(config: Config, backend: Arc<B>, legacy: Arc<K>, today: EntryDate) -> Self {
        let store = Store::new(Arc::clone(&backend));
        let migrator = LegacyMigrator::new(store.clone(), legacy, config.legacy_key.clone());
        migrator.run().await;

        let autosaver = Autosaver::new(store.clone(), config.autosave_delay());
        let journal = Journal::load(store, autosaver, today).await;

        Session {
            config,
            journal,
            backend,
            migrator,
        }
    }

    /// Outcome of this process's migration attempt.
    pub async fn migration(&self) -> MigrationOutcome {
        self.migrator.run().await
    }
}

impl Session<SqliteBackend, FileKeyValueArea> {
    /// Open the journal at `repository`: database, legacy area, migration.
    pub async fn open(repository: &FileSystemRepository, today: EntryDate) -> Result<Self> {
        let config = repository.load_config()?;
        let backend = SqliteBackend::open(&repository.database_path())
            .await
            .map_err(|e| TdiaryError::Database(e.to_string()))?;
        let legacy = FileKeyValueArea::new(repository.local_storage_dir());

        Ok(Session::assemble(config, Arc::new(backend), Arc::new(legacy), today).await)
    }

    /// Write staged edits and close the database.
    pub async fn close(self) -> Result<()> {
        let saved = self.journal.save_now().await;
        self.backend.close().await;
        saved
    }
}
