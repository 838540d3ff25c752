//! Application layer - Use cases and orchestration

pub mod autosave;
pub mod init;
pub mod journal;
pub mod manage_config;
pub mod migrator;
pub mod startup;
pub mod store;
pub mod transfer;

pub use autosave::Autosaver;
pub use journal::Journal;
pub use migrator::{DeferReason, LegacyMigrator, MigrationOutcome};
pub use startup::Session;
pub use store::{Store, StoreFault, StoreResult};
