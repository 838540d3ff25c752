//! Infrastructure layer - Storage media, configuration and external tools

pub mod backend;
pub mod config;
pub mod editor;
pub mod key_value;
#[cfg(test)]
pub mod memory;
pub mod repository;
pub mod schema;
pub mod sqlite;

pub use backend::{KeyValueArea, StorageBackend, StorageError, StorageResult};
pub use config::Config;
pub use editor::EditorSession;
pub use key_value::FileKeyValueArea;
#[cfg(test)]
pub use memory::{Fault, MemoryBackend, MemoryKeyValueArea};
pub use repository::{FileSystemRepository, JournalRepository};
pub use sqlite::SqliteBackend;
