//! Versioned database schema
//!
//! The schema version lives in SQLite's `user_version` pragma. Each
//! [`UpgradeStep`] moves the database from `version - 1` to `version`;
//! opening a database applies every step above its stored version, in order.

/// Schema version number as stored in `PRAGMA user_version`
pub type SchemaVersion = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeStep {
    pub version: SchemaVersion,
    pub description: &'static str,
    pub statements: &'static [&'static str],
}

/// Every schema step, oldest first.
pub const UPGRADE_STEPS: &[UpgradeStep] = &[
    UpgradeStep {
        version: 1,
        description: "create entries table",
        statements: &[r#"
            CREATE TABLE IF NOT EXISTS entries (
                date TEXT PRIMARY KEY NOT NULL,
                text TEXT NOT NULL DEFAULT '',
                photos TEXT NOT NULL DEFAULT '[]',
                mood TEXT NOT NULL DEFAULT '😐'
            )
            "#],
    },
    UpgradeStep {
        version: 2,
        description: "create settings table",
        statements: &[r#"
            CREATE TABLE IF NOT EXISTS settings (
                id TEXT PRIMARY KEY NOT NULL,
                theme TEXT NOT NULL DEFAULT 'light',
                font_size INTEGER NOT NULL DEFAULT 16
            )
            "#],
    },
];

/// The version a fully upgraded database reports.
pub fn latest_version(steps: &[UpgradeStep]) -> SchemaVersion {
    steps.last().map(|step| step.version).unwrap_or(0)
}

/// Steps still to run for a database at `current`.
pub fn pending_steps(steps: &[UpgradeStep], current: SchemaVersion) -> &[UpgradeStep] {
    let start = steps
        .iter()
        .position(|step| step.version > current)
        .unwrap_or(steps.len());
    &steps[start..]
}

/// Check that versions start at 1 and increase by exactly one per step.
pub fn validate_steps(steps: &[UpgradeStep]) -> Result<(), String> {
    for (index, step) in steps.iter().enumerate() {
        let expected = index as SchemaVersion + 1;
        if step.version != expected {
            return Err(format!(
                "schema step '{}' has version {}, expected {}",
                step.description, step.version, expected
            ));
        }
        if step.statements.is_empty() {
            return Err(format!(
                "schema step {} ('{}') has no statements",
                step.version, step.description
            ));
        }
    }
    Ok(())
}
