//! The editing session the command line drives
//!
//! [`Journal`] holds the loaded aggregate state the way a UI would, applies
//! edits to it, and hands every change to the [`Autosaver`]. It never talks to
//! storage except through the Store and the Autosaver.

use crate::application::autosave::Autosaver;
use crate::application::store::Store;
use crate::domain::{search, AggregateState, Entry, EntryDate, FontSize, Settings, Theme};
use crate::error::{Result, TdiaryError};
use crate::infrastructure::StorageBackend;
use tracing::{debug, warn};

pub struct Journal<B> {
    store: Store<B>,
    autosaver: Autosaver<B>,
    state: AggregateState,
    first_run: bool,
    // The stored entries could not be loaded.
    degraded: bool,
}

impl<B: StorageBackend + 'static> Journal<B> {
    /// Load the stored state. On a first run, start from default settings
    /// (staged for saving) and an empty entry for `today`.
    ///
    /// The empty entry is only written once it is edited, so a legacy
    /// migration that was deferred still finds an empty Store next time.
    ///
    /// If the Store cannot be read, the session starts from whatever settings
    /// can still be read and no entries. Nothing is staged, so stored data is
    /// only replaced by explicit edits.
    pub async fn load(store: Store<B>, autosaver: Autosaver<B>, today: EntryDate) -> Self {
        let (state, first_run, degraded) = match store.load_state().await {
            Ok(Some(state)) => (state, false, false),
            Ok(None) => {
                debug!(%today, "no stored journal; starting fresh");
                let state = AggregateState::first_run(today);
                autosaver.stage_settings(state.settings());
                (state, true, false)
            }
            Err(_) => {
                warn!("stored journal could not be read; starting with an empty session");
                let mut state = AggregateState::first_run(today);
                state.apply_settings(store.read_settings().await);
                (state, false, true)
            }
        };

        Journal {
            store,
            autosaver,
            state,
            first_run,
            degraded,
        }
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    pub fn settings(&self) -> Settings {
        self.state.settings()
    }

    pub fn entry(&self, date: EntryDate) -> Option<&Entry> {
        self.state.entries.get(&date)
    }

    /// Navigate to a date, creating its entry if there is none.
    pub fn open_day(&mut self, date: EntryDate) -> &Entry {
        let (entry, created) = self.state.ensure_entry(date);
        // A row that failed to load may exist; an empty placeholder must not replace it.
        if created && !self.degraded {
            self.autosaver.stage_entry(date, entry.clone());
        }
        entry
    }

    pub fn set_text(&mut self, date: EntryDate, text: &str) -> &Entry {
        self.update(date, |entry| entry.text = text.to_string())
    }

    /// Add a line of text after whatever the entry already has.
    pub fn append_text(&mut self, date: EntryDate, text: &str) -> &Entry {
        self.update(date, |entry| {
            if !entry.text.is_empty() && !entry.text.ends_with('\n') {
                entry.text.push('\n');
            }
            entry.text.push_str(text);
        })
    }

    pub fn set_mood(&mut self, date: EntryDate, mood: &str) -> &Entry {
        self.update(date, |entry| entry.set_mood(mood))
    }

    pub fn add_photos(&mut self, date: EntryDate, photos: Vec<String>) -> &Entry {
        self.update(date, |entry| entry.add_photos(photos))
    }

    /// Remove a photo by its 1-based number.
    pub fn remove_photo(&mut self, date: EntryDate, number: usize) -> Result<&Entry> {
        let entry = self
            .state
            .entries
            .get(&date)
            .ok_or_else(|| TdiaryError::EntryNotFound(date.to_string()))?;
        if number == 0 || number > entry.photos.len() {
            return Err(TdiaryError::PhotoNotFound {
                date: date.to_string(),
                number,
            });
        }

        Ok(self.update(date, |entry| {
            entry.remove_photo(number - 1);
        }))
    }

    /// Delete an entry and return the date to show next: the newest remaining
    /// entry, or `fallback` when none is left.
    pub async fn delete_day(&mut self, date: EntryDate, fallback: EntryDate) -> Result<EntryDate> {
        if !self.state.entries.contains_key(&date) {
            return Err(TdiaryError::EntryNotFound(date.to_string()));
        }

        self.autosaver.delete_entry(date).await?;
        self.state.entries.remove(&date);

        Ok(self
            .state
            .entries
            .keys()
            .next_back()
            .copied()
            .unwrap_or(fallback))
    }

    /// Entries matching `query`, newest first.
    pub fn search(&self, query: &str) -> Vec<(EntryDate, &Entry)> {
        search(&self.state.entries, query)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Theme {
        self.update_settings(|settings| settings.theme = theme).theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.update_settings(|settings| settings.theme = settings.theme.toggled())
            .theme
    }

    /// Set the font size, clamped to the allowed range.
    pub fn set_font_size(&mut self, raw: i64) -> FontSize {
        self.update_settings(|settings| settings.font_size = FontSize::clamped(raw))
            .font_size
    }

    pub fn increase_font(&mut self) -> FontSize {
        self.update_settings(|settings| settings.font_size = settings.font_size.increased())
            .font_size
    }

    pub fn decrease_font(&mut self) -> FontSize {
        self.update_settings(|settings| settings.font_size = settings.font_size.decreased())
            .font_size
    }

    /// Write staged edits immediately.
    pub async fn save_now(&self) -> Result<()> {
        Ok(self.autosaver.flush_now().await?)
    }

    /// Replace the whole journal with an imported state.
    ///
    /// Staged edits are written first so they cannot land on top of the
    /// imported data later. The session only changes once the write succeeded.
    pub async fn import(&mut self, incoming: AggregateState) -> Result<()> {
        self.autosaver.flush_now().await?;
        self.store.write_state(&incoming).await?;
        debug!(entries = incoming.entries.len(), "imported journal");
        self.state = incoming;
        Ok(())
    }

    pub fn export(&self) -> Result<String> {
        crate::application::transfer::render_export(&self.state)
    }

    fn update<F>(&mut self, date: EntryDate, change: F) -> &Entry
    where
        F: FnOnce(&mut Entry),
    {
        let (entry, _) = self.state.ensure_entry(date);
        change(entry);
        self.autosaver.stage_entry(date, entry.clone());
        entry
    }

    fn update_settings<F>(&mut self, change: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.state.settings();
        change(&mut settings);
        self.state.apply_settings(settings);
        self.autosaver.stage_settings(settings);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{Fault, MemoryBackend};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn date(s: &str) -> EntryDate {
        s.parse().unwrap()
    }

    async fn journal_over(backend: Arc<MemoryBackend>) -> Journal<MemoryBackend> {
        let store = Store::new(Arc::clone(&backend));
        let autosaver = Autosaver::new(store.clone(), Duration::from_millis(400));
        Journal::load(store, autosaver, date("2024-06-01")).await
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_run_saves_defaults_but_not_empty_today() {
        let backend = Arc::new(MemoryBackend::new());
        let mut journal = journal_over(Arc::clone(&backend)).await;

        assert!(journal.is_first_run());
        assert!(journal.entry(date("2024-06-01")).is_some());

        journal.save_now().await.unwrap();
        assert_eq!(backend.settings_snapshot(), Some(Settings::default()));
        assert!(backend.entries_snapshot().is_empty());

        journal.set_text(date("2024-06-01"), "first words");
        journal.save_now().await.unwrap();
        assert!(backend.entries_snapshot().contains_key(&date("2024-06-01")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loads_existing_state() {
        let mut entries = BTreeMap::new();
        entries.insert(date("2023-12-24"), Entry::with_text("Christmas Eve"));
        let backend = Arc::new(MemoryBackend::seeded(None, entries));
        let journal = journal_over(backend).await;

        assert!(!journal.is_first_run());
        assert_eq!(journal.state().entries.len(), 1);
        assert!(journal.entry(date("2024-06-01")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_entries_leave_stored_data_alone() {
        let settings = Settings {
            theme: Theme::Dark,
            font_size: FontSize::clamped(22),
        };
        let mut entries = BTreeMap::new();
        entries.insert(date("2024-01-01"), Entry::with_text("Tbilisi"));
        let backend = Arc::new(MemoryBackend::seeded(Some(settings), entries.clone()));
        backend.inject(Fault::ReadEntries);

        let mut journal = journal_over(Arc::clone(&backend)).await;
        assert!(!journal.is_first_run());
        assert_eq!(journal.settings(), settings);

        journal.open_day(date("2024-01-01"));
        journal.save_now().await.unwrap();

        assert_eq!(backend.write_count(), 0);
        assert_eq!(backend.settings_snapshot(), Some(settings));
        assert_eq!(backend.entries_snapshot(), entries);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_reach_the_store_after_debounce() {
        let backend = Arc::new(MemoryBackend::new());
        let mut journal = journal_over(Arc::clone(&backend)).await;

        journal.set_text(date("2024-06-02"), "Train to Sintra");
        journal.append_text(date("2024-06-02"), "Fog over the palace");
        journal.set_mood(date("2024-06-02"), "happy");
        tokio::time::sleep(Duration::from_millis(500)).await;

        let stored = &backend.entries_snapshot()[&date("2024-06-02")];
        assert_eq!(stored.text, "Train to Sintra\nFog over the palace");
        assert_eq!(stored.mood, "😀");
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_photo_by_number() {
        let backend = Arc::new(MemoryBackend::new());
        let mut journal = journal_over(backend).await;
        let day = date("2024-06-01");
        journal.add_photos(day, vec!["data:a".to_string(), "data:b".to_string()]);

        let entry = journal.remove_photo(day, 1).unwrap();
        assert_eq!(entry.photos, vec!["data:b".to_string()]);

        assert!(matches!(
            journal.remove_photo(day, 2),
            Err(TdiaryError::PhotoNotFound { number: 2, .. })
        ));
        assert!(matches!(
            journal.remove_photo(date("2001-01-01"), 1),
            Err(TdiaryError::EntryNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_selects_newest_remaining() {
        let mut entries = BTreeMap::new();
        entries.insert(date("2024-01-01"), Entry::with_text("a"));
        entries.insert(date("2024-03-01"), Entry::with_text("b"));
        entries.insert(date("2024-05-01"), Entry::with_text("c"));
        let backend = Arc::new(MemoryBackend::seeded(None, entries));
        let mut journal = journal_over(Arc::clone(&backend)).await;
        let today = date("2024-06-01");

        assert_eq!(
            journal.delete_day(date("2024-05-01"), today).await.unwrap(),
            date("2024-03-01")
        );
        assert!(!backend.entries_snapshot().contains_key(&date("2024-05-01")));

        journal.delete_day(date("2024-03-01"), today).await.unwrap();
        assert_eq!(
            journal.delete_day(date("2024-01-01"), today).await.unwrap(),
            today
        );
        assert!(matches!(
            journal.delete_day(date("2024-01-01"), today).await,
            Err(TdiaryError::EntryNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_keeps_session_entry() {
        let mut entries = BTreeMap::new();
        entries.insert(date("2024-01-01"), Entry::with_text("a"));
        let backend = Arc::new(MemoryBackend::seeded(None, entries));
        let mut journal = journal_over(Arc::clone(&backend)).await;
        backend.inject(Fault::RemoveEntry);

        assert!(journal
            .delete_day(date("2024-01-01"), date("2024-06-01"))
            .await
            .is_err());
        assert!(journal.entry(date("2024-01-01")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_font_and_theme_controls() {
        let backend = Arc::new(MemoryBackend::new());
        let mut journal = journal_over(Arc::clone(&backend)).await;

        assert_eq!(journal.toggle_theme(), Theme::Dark);
        assert_eq!(journal.set_font_size(100).get(), 24);
        assert_eq!(journal.increase_font().get(), 24);
        assert_eq!(journal.decrease_font().get(), 23);
        journal.save_now().await.unwrap();

        let stored = backend.settings_snapshot().unwrap();
        assert_eq!(stored.theme, Theme::Dark);
        assert_eq!(stored.font_size.get(), 23);
    }

    #[tokio::test(start_paused = true)]
    async fn test_import_replaces_everything() {
        let mut entries = BTreeMap::new();
        entries.insert(date("2020-01-01"), Entry::with_text("old"));
        let backend = Arc::new(MemoryBackend::seeded(None, entries));
        let mut journal = journal_over(Arc::clone(&backend)).await;
        journal.set_text(date("2020-01-02"), "unsaved edit");

        let incoming = crate::application::transfer::parse_import(
            r#"{"theme":"dark","fontSize":13,"entries":{"2024-01-01":{"text":"hi"}}}"#,
        )
        .unwrap();
        journal.import(incoming.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(journal.state(), &incoming);
        assert_eq!(backend.entries_snapshot(), incoming.entries);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_import_leaves_session() {
        let backend = Arc::new(MemoryBackend::new());
        let mut journal = journal_over(Arc::clone(&backend)).await;
        journal.save_now().await.unwrap();
        let before = journal.state().clone();
        backend.inject(Fault::ReplaceBeforeCommit);

        let incoming = AggregateState::first_run(date("1999-01-01"));
        assert!(journal.import(incoming).await.is_err());
        assert_eq!(journal.state(), &before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_newest_first() {
        let backend = Arc::new(MemoryBackend::new());
        let mut journal = journal_over(backend).await;
        journal.set_text(date("2024-05-01"), "Beach in Nazaré");
        journal.set_text(date("2024-05-03"), "beach again");
        journal.set_text(date("2024-05-02"), "Museum");

        let hits: Vec<_> = journal.search("BEACH").into_iter().map(|(d, _)| d).collect();
        assert_eq!(hits, vec![date("2024-05-03"), date("2024-05-01")]);
    }
}
