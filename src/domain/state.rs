//! Aggregate journal state used for export, import and the legacy blob

use crate::domain::entry::{Entry, EntryDate};
use crate::domain::settings::{null_as_default, FontSize, Settings, Theme};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Reasons a JSON document is not a valid journal state
#[derive(Debug, Error)]
pub enum StateParseError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at the top level")]
    NotAnObject,

    #[error("missing \"entries\" object")]
    MissingEntries,

    #[error("invalid journal data: {0}")]
    Invalid(String),
}

/// Settings plus every entry, flattened into one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct AggregateState {
    pub theme: Theme,
    #[serde(rename = "fontSize")]
    pub font_size: FontSize,
    pub entries: BTreeMap<EntryDate, Entry>,
}

#[derive(Deserialize)]
struct StateDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    theme: Theme,
    #[serde(rename = "fontSize", default, deserialize_with = "null_as_default")]
    font_size: FontSize,
    entries: BTreeMap<EntryDate, Entry>,
}

impl AggregateState {
    pub fn new(settings: Settings, entries: BTreeMap<EntryDate, Entry>) -> Self {
        AggregateState {
            theme: settings.theme,
            font_size: settings.font_size,
            entries,
        }
    }

    /// State for a journal that has never been saved: defaults plus an empty
    /// entry for today.
    pub fn first_run(today: EntryDate) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(today, Entry::default());
        AggregateState {
            entries,
            ..AggregateState::default()
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            theme: self.theme,
            font_size: self.font_size,
        }
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.theme = settings.theme;
        self.font_size = settings.font_size;
    }

    /// Parse the export document format.
    ///
    /// `entries` is mandatory; `theme` and `fontSize` fall back to defaults and
    /// every entry is backfilled with default fields.
    pub fn from_json(text: &str) -> Result<Self, StateParseError> {
        let value: Value = serde_json::from_str(text)?;
        let object = value.as_object().ok_or(StateParseError::NotAnObject)?;

        match object.get("entries") {
            None | Some(Value::Null) => return Err(StateParseError::MissingEntries),
            Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(StateParseError::Invalid(
                    "\"entries\" must be an object keyed by YYYY-MM-DD dates".to_string(),
                ))
            }
        }

        let document: StateDocument = serde_json::from_value(value)
            .map_err(|e| StateParseError::Invalid(e.to_string()))?;

        Ok(AggregateState {
            theme: document.theme,
            font_size: document.font_size,
            entries: document.entries,
        })
    }

    /// Render the export document (two-space indented).
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Get the entry for a date, creating an empty one if needed.
    /// The flag is true when the entry was created.
    pub fn ensure_entry(&mut self, date: EntryDate) -> (&mut Entry, bool) {
        let created = !self.entries.contains_key(&date);
        (self.entries.entry(date).or_default(), created)
    }
}
