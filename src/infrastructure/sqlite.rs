//! SQLite storage medium (sqlx)

use crate::domain::{Entry, EntryDate, FontSize, Settings, Theme};
use crate::infrastructure::backend::{StorageBackend, StorageError, StorageResult};
use crate::infrastructure::schema::{
    latest_version, pending_steps, validate_steps, SchemaVersion, UpgradeStep, UPGRADE_STEPS,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Primary key of the settings singleton row.
const SETTINGS_ID: &str = "app";

/// Journal database handle.
///
/// Open it once at startup, share it behind an `Arc`, and [`close`] it on
/// shutdown.
///
/// [`close`]: SqliteBackend::close
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (creating if needed) the database file and bring its schema up to date.
    pub async fn open(path: &Path) -> StorageResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        apply_upgrades(&pool, UPGRADE_STEPS).await?;
        debug!(path = %path.display(), "opened journal database");
        Ok(SqliteBackend { pool })
    }

    /// Private in-memory database, mostly for tests.
    pub async fn in_memory() -> StorageResult<Self> {
        let pool = memory_pool().await?;
        apply_upgrades(&pool, UPGRADE_STEPS).await?;
        Ok(SqliteBackend { pool })
    }

    pub async fn schema_version(&self) -> StorageResult<SchemaVersion> {
        read_user_version(&self.pool).await
    }

    /// Close every pooled connection. Later operations fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn memory_pool() -> StorageResult<SqlitePool> {
    // Every connection to `:memory:` is its own database, so keep exactly one alive.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

async fn read_user_version(pool: &SqlitePool) -> StorageResult<SchemaVersion> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    SchemaVersion::try_from(version)
        .map_err(|_| StorageError::Corrupt(format!("negative schema version {}", version)))
}

/// Run every pending step, each in its own transaction together with the
/// `user_version` bump. Returns the resulting version.
async fn apply_upgrades(pool: &SqlitePool, steps: &[UpgradeStep]) -> StorageResult<SchemaVersion> {
    validate_steps(steps).map_err(|message| StorageError::Upgrade {
        version: 0,
        message,
    })?;

    let mut current = read_user_version(pool).await?;
    for step in pending_steps(steps, current) {
        let mut tx = pool.begin().await?;
        for statement in step.statements {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::Upgrade {
                    version: step.version,
                    message: e.to_string(),
                })?;
        }
        // PRAGMA values cannot be bound as parameters.
        let bump = format!("PRAGMA user_version = {}", step.version);
        sqlx::query(&bump).execute(&mut *tx).await?;
        tx.commit().await?;

        info!(
            version = step.version,
            step = step.description,
            "upgraded journal schema"
        );
        current = step.version;
    }

    if current > latest_version(steps) {
        debug!(current, "database schema is newer than this build");
    }
    Ok(current)
}

fn entry_from_row(row: &SqliteRow) -> StorageResult<(EntryDate, Entry)> {
    let raw_date: String = row.try_get("date")?;
    let date = raw_date.parse::<EntryDate>().map_err(StorageError::Corrupt)?;
    let photos_json: String = row.try_get("photos")?;
    let photos: Vec<String> = serde_json::from_str(&photos_json)?;

    Ok((
        date,
        Entry {
            text: row.try_get("text")?,
            photos,
            mood: row.try_get("mood")?,
        },
    ))
}

async fn upsert_entry_row(
    conn: &mut SqliteConnection,
    date: EntryDate,
    entry: &Entry,
) -> StorageResult<()> {
    let photos_json = serde_json::to_string(&entry.photos)?;

    sqlx::query(
        r#"
        INSERT INTO entries (date, text, photos, mood)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(date) DO UPDATE SET
            text = excluded.text,
            photos = excluded.photos,
            mood = excluded.mood
        "#,
    )
    .bind(date.to_string())
    .bind(&entry.text)
    .bind(photos_json)
    .bind(&entry.mood)
    .execute(conn)
    .await?;

    Ok(())
}

async fn upsert_settings_row(conn: &mut SqliteConnection, settings: &Settings) -> StorageResult<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (id, theme, font_size)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            theme = excluded.theme,
            font_size = excluded.font_size
        "#,
    )
    .bind(SETTINGS_ID)
    .bind(settings.theme.as_str())
    .bind(settings.font_size.get() as i64)
    .execute(conn)
    .await?;

    Ok(())
}

impl StorageBackend for SqliteBackend {
    async fn read_settings(&self) -> StorageResult<Option<Settings>> {
        let row = sqlx::query("SELECT theme, font_size FROM settings WHERE id = ?")
            .bind(SETTINGS_ID)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let theme: String = row.try_get("theme")?;
        let font_size: i64 = row.try_get("font_size")?;
        Ok(Some(Settings {
            theme: Theme::from_str(&theme).map_err(StorageError::Corrupt)?,
            font_size: FontSize::clamped(font_size),
        }))
    }

    async fn write_settings(&self, settings: &Settings) -> StorageResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_settings_row(&mut conn, settings).await
    }

    async fn get_entry(&self, date: EntryDate) -> StorageResult<Option<Entry>> {
        let row = sqlx::query("SELECT date, text, photos, mood FROM entries WHERE date = ?")
            .bind(date.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(entry_from_row(&row)?.1)),
            None => Ok(None),
        }
    }

    async fn list_entries(&self) -> StorageResult<BTreeMap<EntryDate, Entry>> {
        let rows = sqlx::query("SELECT date, text, photos, mood FROM entries ORDER BY date")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(entry_from_row).collect()
    }

    async fn entry_count(&self) -> StorageResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn put_entry(&self, date: EntryDate, entry: &Entry) -> StorageResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_entry_row(&mut conn, date, entry).await
    }

    async fn remove_entry(&self, date: EntryDate) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE date = ?")
            .bind(date.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_all(
        &self,
        settings: &Settings,
        entries: &BTreeMap<EntryDate, Entry>,
    ) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM entries").execute(&mut *tx).await?;
        for (date, entry) in entries {
            upsert_entry_row(&mut *tx, *date, entry).await?;
        }
        upsert_settings_row(&mut *tx, settings).await?;

        tx.commit().await?;
        debug!(entries = entries.len(), "replaced journal contents");
        Ok(())
    }
}
