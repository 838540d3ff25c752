//! In-memory storage media with fault injection, used in place of the
//! database and the key/value directory in tests.

use crate::domain::{Entry, EntryDate, Settings};
use crate::infrastructure::backend::{KeyValueArea, StorageBackend, StorageError, StorageResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Operation that can be made to fail on demand. Injected faults stay active
/// until cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    ReadSettings,
    WriteSettings,
    ReadEntries,
    CountEntries,
    PutEntry,
    RemoveEntry,
    /// `replace_all` stages every write, then fails instead of committing.
    ReplaceBeforeCommit,
    KeyGet,
    KeySet,
    KeyRemove,
}

impl Fault {
    fn name(self) -> &'static str {
        match self {
            Fault::ReadSettings => "read settings",
            Fault::WriteSettings => "write settings",
            Fault::ReadEntries => "read entries",
            Fault::CountEntries => "count entries",
            Fault::PutEntry => "put entry",
            Fault::RemoveEntry => "remove entry",
            Fault::ReplaceBeforeCommit => "replace before commit",
            Fault::KeyGet => "key get",
            Fault::KeySet => "key set",
            Fault::KeyRemove => "key remove",
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct FaultSet(Mutex<HashSet<Fault>>);

impl FaultSet {
    fn check(&self, fault: Fault) -> StorageResult<()> {
        if lock(&self.0).contains(&fault) {
            Err(StorageError::Injected(fault.name()))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Tables {
    settings: Option<Settings>,
    entries: BTreeMap<EntryDate, Entry>,
}

/// Journal tables held in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    faults: FaultSet,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Backend pre-populated without counting as writes.
    pub fn seeded(settings: Option<Settings>, entries: BTreeMap<EntryDate, Entry>) -> Self {
        MemoryBackend {
            tables: Mutex::new(Tables { settings, entries }),
            ..MemoryBackend::default()
        }
    }

    pub fn inject(&self, fault: Fault) {
        lock(&self.faults.0).insert(fault);
    }

    pub fn clear(&self, fault: Fault) {
        lock(&self.faults.0).remove(&fault);
    }

    /// Number of committed mutations so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn settings_snapshot(&self) -> Option<Settings> {
        lock(&self.tables).settings
    }

    pub fn entries_snapshot(&self) -> BTreeMap<EntryDate, Entry> {
        lock(&self.tables).entries.clone()
    }

    fn committed(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl StorageBackend for MemoryBackend {
    async fn read_settings(&self) -> StorageResult<Option<Settings>> {
        self.faults.check(Fault::ReadSettings)?;
        Ok(lock(&self.tables).settings)
    }

    async fn write_settings(&self, settings: &Settings) -> StorageResult<()> {
        self.faults.check(Fault::WriteSettings)?;
        lock(&self.tables).settings = Some(*settings);
        self.committed();
        Ok(())
    }

    async fn get_entry(&self, date: EntryDate) -> StorageResult<Option<Entry>> {
        self.faults.check(Fault::ReadEntries)?;
        Ok(lock(&self.tables).entries.get(&date).cloned())
    }

    async fn list_entries(&self) -> StorageResult<BTreeMap<EntryDate, Entry>> {
        self.faults.check(Fault::ReadEntries)?;
        Ok(lock(&self.tables).entries.clone())
    }

    async fn entry_count(&self) -> StorageResult<usize> {
        self.faults.check(Fault::CountEntries)?;
        Ok(lock(&self.tables).entries.len())
    }

    async fn put_entry(&self, date: EntryDate, entry: &Entry) -> StorageResult<()> {
        self.faults.check(Fault::PutEntry)?;
        lock(&self.tables).entries.insert(date, entry.clone());
        self.committed();
        Ok(())
    }

    async fn remove_entry(&self, date: EntryDate) -> StorageResult<bool> {
        self.faults.check(Fault::RemoveEntry)?;
        let existed = lock(&self.tables).entries.remove(&date).is_some();
        self.committed();
        Ok(existed)
    }

    async fn replace_all(
        &self,
        settings: &Settings,
        entries: &BTreeMap<EntryDate, Entry>,
    ) -> StorageResult<()> {
        let mut tables = lock(&self.tables);

        let mut staged = tables.clone();
        staged.entries.clear();
        for (date, entry) in entries {
            staged.entries.insert(*date, entry.clone());
        }
        staged.settings = Some(*settings);

        // Dropping `staged` here is the rollback.
        self.faults.check(Fault::ReplaceBeforeCommit)?;

        *tables = staged;
        self.committed();
        Ok(())
    }
}

/// Key/value area held in memory.
#[derive(Debug, Default)]
pub struct MemoryKeyValueArea {
    values: Mutex<HashMap<String, String>>,
    faults: FaultSet,
    reads: AtomicUsize,
}

impl MemoryKeyValueArea {
    pub fn new() -> Self {
        MemoryKeyValueArea::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let area = MemoryKeyValueArea::default();
        lock(&area.values).insert(key.to_string(), value.to_string());
        area
    }

    pub fn inject(&self, fault: Fault) {
        lock(&self.faults.0).insert(fault);
    }

    pub fn clear(&self, fault: Fault) {
        lock(&self.faults.0).remove(&fault);
    }

    /// Number of `get` calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.values).contains_key(key)
    }
}

impl KeyValueArea for MemoryKeyValueArea {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.faults.check(Fault::KeyGet)?;
        Ok(lock(&self.values).get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.faults.check(Fault::KeySet)?;
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.faults.check(Fault::KeyRemove)?;
        lock(&self.values).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> EntryDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_replace_fault_leaves_tables_untouched() {
        let mut entries = BTreeMap::new();
        entries.insert(date("2024-01-01"), Entry::with_text("kept"));
        let backend = MemoryBackend::seeded(None, entries.clone());
        backend.inject(Fault::ReplaceBeforeCommit);

        let mut replacement = BTreeMap::new();
        replacement.insert(date("2024-02-02"), Entry::default());
        let result = backend
            .replace_all(&Settings::default(), &replacement)
            .await;

        assert!(matches!(result, Err(StorageError::Injected(_))));
        assert_eq!(backend.entries_snapshot(), entries);
        assert_eq!(backend.settings_snapshot(), None);
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn test_cleared_fault_stops_failing() {
        let backend = MemoryBackend::new();
        backend.inject(Fault::PutEntry);
        assert!(backend
            .put_entry(date("2024-01-01"), &Entry::default())
            .await
            .is_err());

        backend.clear(Fault::PutEntry);
        backend
            .put_entry(date("2024-01-01"), &Entry::default())
            .await
            .unwrap();
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn test_key_value_counts_reads() {
        let area = MemoryKeyValueArea::with_value("k", "v");
        assert_eq!(area.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(area.get("other").await.unwrap(), None);
        assert_eq!(area.read_count(), 2);

        area.inject(Fault::KeyRemove);
        assert!(area.remove("k").await.is_err());
        assert!(area.contains("k"));
    }
}
