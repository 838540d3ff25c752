//! Domain layer - Journal records and the pure rules around them

pub mod entry;
pub mod photo;
pub mod search;
pub mod settings;
pub mod state;
pub mod time_ref;

pub use entry::{resolve_mood, Entry, EntryDate, MOOD_PRESETS, NEUTRAL_MOOD};
pub use search::search;
pub use settings::{FontSize, Settings, Theme};
pub use state::{AggregateState, StateParseError};
pub use time_ref::{resolve_date, TimeReference};
