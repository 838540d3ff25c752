//! Output formatting utilities

use crate::domain::{photo, Entry, EntryDate, Settings};

/// Characters of text shown per row in entry lists.
pub const SNIPPET_CHARS: usize = 50;

/// Format search results, one row per entry
pub fn format_entry_list(entries: &[(EntryDate, &Entry)]) -> String {
    if entries.is_empty() {
        return "No entries found".to_string();
    }

    let mut output = String::new();
    for (date, entry) in entries {
        let snippet = entry.snippet(SNIPPET_CHARS);
        if snippet.is_empty() {
            output.push_str(&format!("{}  {}\n", date, entry.mood));
        } else {
            output.push_str(&format!("{}  {}  {}\n", date, entry.mood, snippet));
        }
    }
    output
}

/// Format one entry in full
pub fn format_entry(date: EntryDate, entry: &Entry) -> String {
    let mut output = format!("{}  {}\n", date, entry.mood);

    if entry.text.is_empty() {
        output.push_str("\n(empty)\n");
    } else {
        output.push('\n');
        output.push_str(&entry.text);
        if !entry.text.ends_with('\n') {
            output.push('\n');
        }
    }

    if !entry.photos.is_empty() {
        output.push_str("\nPhotos:\n");
        for (i, url) in entry.photos.iter().enumerate() {
            let mime = photo::data_url_mime(url).unwrap_or("unknown");
            output.push_str(&format!(
                "  {}. {} ({})\n",
                i + 1,
                mime,
                format_size(photo::data_url_size(url))
            ));
        }
    }

    output
}

pub fn format_settings(settings: &Settings) -> String {
    format!(
        "theme = {}\nfont_size = {}\n",
        settings.theme, settings.font_size
    )
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FontSize, Theme};

    fn date(s: &str) -> EntryDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_empty_list() {
        let entries = vec![];
        assert_eq!(format_entry_list(&entries), "No entries found");
    }

    #[test]
    fn test_format_entry_list_truncates_text() {
        let long = Entry::with_text("x".repeat(80));
        let short = Entry::with_text("Ferry to Naxos\nwindy");
        let entries = vec![(date("2024-08-02"), &long), (date("2024-08-01"), &short)];

        let output = format_entry_list(&entries);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], format!("2024-08-02  😐  {}", "x".repeat(50)));
        assert_eq!(lines[1], "2024-08-01  😐  Ferry to Naxos windy");
    }

    #[test]
    fn test_format_entry_with_photos() {
        let mut entry = Entry::with_text("Market day");
        entry.add_photos([
            photo::to_data_url("image/jpeg", &[0u8; 3000]),
            photo::to_data_url("image/png", &[0u8; 12]),
        ]);

        let output = format_entry(date("2024-08-03"), &entry);
        assert!(output.starts_with("2024-08-03  😐\n\nMarket day\n"));
        assert!(output.contains("  1. image/jpeg (2 KB)"));
        assert!(output.contains("  2. image/png (12 B)"));
    }

    #[test]
    fn test_format_empty_entry() {
        let output = format_entry(date("2024-08-03"), &Entry::default());
        assert!(output.contains("(empty)"));
        assert!(!output.contains("Photos"));
    }

    #[test]
    fn test_format_settings() {
        let settings = Settings {
            theme: Theme::Dark,
            font_size: FontSize::clamped(18),
        };
        assert_eq!(format_settings(&settings), "theme = dark\nfont_size = 18px\n");
    }
}
