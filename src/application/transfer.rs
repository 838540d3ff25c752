//! JSON export and import of the whole journal

use crate::domain::{AggregateState, StateParseError};
use crate::error::{Result, TdiaryError};
use chrono::NaiveDate;
use std::path::Path;

/// Default export file name for a given day.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("travel-diary-{}.json", today.format("%Y-%m-%d"))
}

pub fn render_export(state: &AggregateState) -> Result<String> {
    Ok(state.to_json_pretty()?)
}

/// Validate an import document. Nothing is written here, so a rejected
/// document never touches the journal.
pub fn parse_import(text: &str) -> Result<AggregateState> {
    AggregateState::from_json(text).map_err(|e| match e {
        StateParseError::MissingEntries => {
            TdiaryError::InvalidImport("file has no \"entries\" object".to_string())
        }
        other => TdiaryError::InvalidImport(other.to_string()),
    })
}

pub async fn read_import_file(path: &Path) -> Result<AggregateState> {
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8(bytes).map_err(|_| {
        TdiaryError::InvalidImport(format!("{} is not UTF-8 text", path.display()))
    })?;
    parse_import(&text)
}
