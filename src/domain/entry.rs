//! Journal entries and their date keys

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Mood stored for entries that never had one set.
pub const NEUTRAL_MOOD: &str = "😐";

/// Moods offered as one-tap choices, with their command-line names.
pub const MOOD_PRESETS: [(&str, &str); 4] = [
    ("happy", "😀"),
    ("neutral", NEUTRAL_MOOD),
    ("sad", "😢"),
    ("angry", "😡"),
];

/// Calendar date identifying exactly one entry (`YYYY-MM-DD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryDate(NaiveDate);

impl EntryDate {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        EntryDate(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for EntryDate {
    fn from(date: NaiveDate) -> Self {
        EntryDate(date)
    }
}

impl fmt::Display for EntryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for EntryDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields; the key format does not.
        if s.len() != 10 {
            return Err(format!("Invalid entry date '{}': expected YYYY-MM-DD", s));
        }
        NaiveDate::parse_from_str(s, Self::FORMAT)
            .map(EntryDate)
            .map_err(|_| format!("Invalid entry date '{}': expected YYYY-MM-DD", s))
    }
}

impl Serialize for EntryDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntryDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One day's journal record.
///
/// Missing fields deserialize to their defaults, so partial records from
/// imports and the legacy blob come out complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default = "default_mood")]
    pub mood: String,
}

fn default_mood() -> String {
    NEUTRAL_MOOD.to_string()
}

impl Default for Entry {
    fn default() -> Self {
        Entry {
            text: String::new(),
            photos: Vec::new(),
            mood: default_mood(),
        }
    }
}

impl Entry {
    pub fn with_text(text: impl Into<String>) -> Self {
        Entry {
            text: text.into(),
            ..Entry::default()
        }
    }

    /// Set the mood from a preset name, a literal symbol, or blank for neutral.
    pub fn set_mood(&mut self, input: &str) {
        self.mood = resolve_mood(input);
    }

    pub fn add_photos<I>(&mut self, photos: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.photos.extend(photos);
    }

    /// Remove the photo at a 0-based position, keeping the order of the rest.
    pub fn remove_photo(&mut self, index: usize) -> Option<String> {
        if index < self.photos.len() {
            Some(self.photos.remove(index))
        } else {
            None
        }
    }

    /// First `max_chars` characters of the text, on a single line.
    pub fn snippet(&self, max_chars: usize) -> String {
        self.text
            .chars()
            .take(max_chars)
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect()
    }
}

/// Map a mood argument to the stored symbol.
pub fn resolve_mood(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return default_mood();
    }

    let lowered = trimmed.to_lowercase();
    MOOD_PRESETS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, symbol)| symbol.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
