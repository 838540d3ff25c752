//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tdiary")]
#[command(about = "Terminal travel diary", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Date to show (e.g., today, yesterday, "last monday", 2025-01-17)
    #[arg(value_name = "TIME_REF")]
    pub time_ref: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new journal
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Set or append the text of an entry
    Write {
        #[arg(value_name = "TIME_REF")]
        time_ref: String,

        /// Entry text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Add to the existing text instead of replacing it
        #[arg(short, long)]
        append: bool,
    },

    /// Edit an entry's text in your editor
    Edit {
        #[arg(value_name = "TIME_REF")]
        time_ref: Option<String>,
    },

    /// Set the mood of an entry (happy, neutral, sad, angry, or any symbol)
    Mood {
        #[arg(value_name = "TIME_REF")]
        time_ref: String,

        mood: String,
    },

    /// Attach or remove photos
    Photo {
        #[command(subcommand)]
        action: PhotoCommand,
    },

    /// Delete an entry
    Delete {
        #[arg(value_name = "TIME_REF")]
        time_ref: String,
    },

    /// List entries, newest first
    List {
        /// Only entries whose date or text contains this (case-insensitive)
        query: Option<String>,
    },

    /// Export the journal as JSON
    Export {
        /// Output file, or '-' for stdout (default: travel-diary-<today>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the journal with an exported JSON file
    Import {
        file: PathBuf,
    },

    /// Show or change the theme (light, dark, toggle)
    Theme {
        value: Option<String>,
    },

    /// Show or change the font size (12-24, up, down)
    Font {
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },

    /// View or modify configuration
    Config {
        /// Config key to get or set
        key: Option<String>,

        /// Value to set (if provided, sets the key)
        value: Option<String>,

        /// List all configuration
        #[arg(short, long)]
        list: bool,
    },

    /// Show what the legacy data migration did on this start
    Migrate,
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommand {
    /// Attach image files to an entry
    Add {
        #[arg(value_name = "TIME_REF")]
        time_ref: String,

        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Remove a photo by its number as shown for the entry
    Remove {
        #[arg(value_name = "TIME_REF")]
        time_ref: String,

        number: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_time_ref() {
        let cli = Cli::try_parse_from(["tdiary", "yesterday"]).unwrap();
        assert_eq!(cli.time_ref.as_deref(), Some("yesterday"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_write_joins_words() {
        let cli =
            Cli::try_parse_from(["tdiary", "write", "today", "Sunset", "at", "Oia", "-a"]).unwrap();
        match cli.command {
            Some(Commands::Write {
                time_ref,
                text,
                append,
            }) => {
                assert_eq!(time_ref, "today");
                assert_eq!(text.join(" "), "Sunset at Oia");
                assert!(append);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_photo_remove() {
        let cli = Cli::try_parse_from(["tdiary", "photo", "remove", "2024-01-01", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Photo {
                action: PhotoCommand::Remove { number: 2, .. }
            })
        ));
    }

    #[test]
    fn test_export_to_stdout() {
        let cli = Cli::try_parse_from(["tdiary", "export", "-o", "-"]).unwrap();
        match cli.command {
            Some(Commands::Export { output }) => assert_eq!(output, Some(PathBuf::from("-"))),
            other => panic!("unexpected parse: {:?}", other),
        }
    }
}
