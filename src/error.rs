//! Error types for tdiary

use crate::application::store::StoreFault;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tdiary application
#[derive(Debug, Error)]
pub enum TdiaryError {
    #[error("Not a tdiary directory: {0}")]
    NotTdiaryDirectory(PathBuf),

    #[error("Invalid time reference: {0}")]
    InvalidTimeReference(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Entry {date} has no photo #{number}")]
    PhotoNotFound { date: String, number: usize },

    #[error("Not an image file: {0}")]
    InvalidPhoto(PathBuf),

    #[error("Invalid import: {0}")]
    InvalidImport(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreFault),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl TdiaryError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TdiaryError::NotTdiaryDirectory(_) => 2,
            TdiaryError::InvalidTimeReference(_) => 3,
            TdiaryError::EntryNotFound(_) | TdiaryError::PhotoNotFound { .. } => 4,
            TdiaryError::InvalidImport(_) => 5,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            TdiaryError::NotTdiaryDirectory(path) => {
                format!(
                    "Not a tdiary directory: {}\n\n\
                    Suggestions:\n\
                    • Run 'tdiary init' in this directory to create a new journal\n\
                    • Navigate to an existing tdiary directory\n\
                    • Set TDIARY_ROOT environment variable to your journal path",
                    path.display()
                )
            }
            TdiaryError::InvalidTimeReference(ref_str) => {
                format!(
                    "Invalid time reference: '{}'\n\n\
                    Valid time references:\n\
                    • today, yesterday, tomorrow\n\
                    • monday, tuesday, ..., sunday (most recent)\n\
                    • last monday, next friday, etc.\n\
                    • Specific dates: YYYY-MM-DD (e.g., 2025-01-17)\n\n\
                    Examples:\n\
                    tdiary today\n\
                    tdiary write yesterday Walked along the harbour\n\
                    tdiary 2025-01-15",
                    ref_str
                )
            }
            TdiaryError::EntryNotFound(date) => {
                format!(
                    "No entry for {}\n\n\
                    Suggestions:\n\
                    • Use 'tdiary list' to see existing entries\n\
                    • Run 'tdiary {}' to create it",
                    date, date
                )
            }
            TdiaryError::InvalidImport(msg) => {
                format!(
                    "Invalid import: {}\n\n\
                    Expected a JSON file like the one 'tdiary export' writes:\n\
                    {{ \"theme\": \"light\", \"fontSize\": 16, \"entries\": {{ \"2024-01-01\": {{ \"text\": \"...\" }} }} }}\n\
                    Your journal was left unchanged.",
                    msg
                )
            }
            TdiaryError::Storage(fault) => {
                format!(
                    "{}\n\n\
                    Your changes may not have been saved. Run with TDIARY_LOG=tdiary=debug for details.",
                    fault
                )
            }
            TdiaryError::Editor(msg) => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Check that your editor is installed and in PATH\n\
                    • Set EDITOR environment variable (e.g., export EDITOR=nano)\n\
                    • Configure editor: tdiary config editor 'vim'",
                    msg
                )
            }
            TdiaryError::Config(msg) => {
                if msg.contains("Invalid theme") {
                    format!(
                        "{}\n\n\
                        Valid themes: light, dark, toggle\n\
                        Example: tdiary theme dark",
                        msg
                    )
                } else if msg.contains("font size") {
                    format!(
                        "{}\n\n\
                        Font size is a number of pixels between 12 and 24, or 'up' / 'down'\n\
                        Example: tdiary font 18",
                        msg
                    )
                } else {
                    msg.clone()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using TdiaryError
pub type Result<T> = std::result::Result<T, TdiaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(TdiaryError::NotTdiaryDirectory(PathBuf::from("/")).exit_code(), 2);
        assert_eq!(TdiaryError::InvalidTimeReference("x".into()).exit_code(), 3);
        assert_eq!(TdiaryError::EntryNotFound("2024-01-01".into()).exit_code(), 4);
        assert_eq!(
            TdiaryError::PhotoNotFound {
                date: "2024-01-01".into(),
                number: 3
            }
            .exit_code(),
            4
        );
        assert_eq!(TdiaryError::InvalidImport("no entries".into()).exit_code(), 5);
        assert_eq!(TdiaryError::Config("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_not_tdiary_directory_suggestion() {
        let err = TdiaryError::NotTdiaryDirectory(PathBuf::from("/tmp/test"));
        let msg = err.display_with_suggestions();
        assert!(msg.contains("tdiary init"));
        assert!(msg.contains("TDIARY_ROOT"));
        assert!(msg.contains("Suggestions"));
    }

    #[test]
    fn test_invalid_time_reference_examples() {
        let err = TdiaryError::InvalidTimeReference("baddate".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("today"));
        assert!(msg.contains("YYYY-MM-DD"));
        assert!(msg.contains("tdiary today"));
    }

    #[test]
    fn test_invalid_import_says_unchanged() {
        let err = TdiaryError::InvalidImport("missing \"entries\"".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("missing \"entries\""));
        assert!(msg.contains("tdiary export"));
        assert!(msg.contains("unchanged"));
    }

    #[test]
    fn test_storage_fault_message() {
        let err = TdiaryError::from(StoreFault::new("upsert entry"));
        let msg = err.display_with_suggestions();
        assert!(msg.contains("upsert entry"));
        assert!(msg.contains("TDIARY_LOG"));
    }

    #[test]
    fn test_config_theme_suggestions() {
        let err = TdiaryError::Config("Invalid theme: blue".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("light, dark, toggle"));
    }

    #[test]
    fn test_other_errors_fallback() {
        let err = TdiaryError::Database("locked".to_string());
        assert_eq!(err.display_with_suggestions(), "Database error: locked");
    }
}
