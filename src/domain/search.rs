//! Keyword filtering over entries

use crate::domain::entry::{Entry, EntryDate};
use std::collections::BTreeMap;

/// Entries matching `query`, newest first.
///
/// A blank query matches everything. Otherwise an entry matches when its date
/// or its text contains the query, ignoring case.
pub fn search<'a>(
    entries: &'a BTreeMap<EntryDate, Entry>,
    query: &str,
) -> Vec<(EntryDate, &'a Entry)> {
    let needle = query.trim().to_lowercase();

    entries
        .iter()
        .rev()
        .filter(|(date, entry)| {
            needle.is_empty()
                || date.to_string().contains(&needle)
                || entry.text.to_lowercase().contains(&needle)
        })
        .map(|(date, entry)| (*date, entry))
        .collect()
}
