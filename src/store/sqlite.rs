use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use tracing::{debug, info};

use super::{RecordStore, SlopRecord, SlopStats};
use crate::{
    errors::{Result, SlopError},
    modes::GenerationMode,
    orchestrator::PipelineResult,
    util::{now_utc, utc_rfc3339},
};

/// Schema steps, applied in order. `PRAGMA user_version` records how many
/// have run; append new steps, never edit old ones.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE slops (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        original_uri TEXT NOT NULL,
        slop_uri     TEXT NOT NULL,
        caption      TEXT NOT NULL,
        slop_level   TEXT NOT NULL,
        slop_mode    TEXT NOT NULL DEFAULT 'facebook',
        is_favorite  INTEGER NOT NULL DEFAULT 0,
        created_at   TEXT NOT NULL
    );
    "#,
    r#"
    CREATE INDEX idx_slops_created_at ON slops(created_at DESC);
    CREATE INDEX idx_slops_favorite ON slops(is_favorite);
    "#,
];

const COLUMNS: &str =
    "id, original_uri, slop_uri, caption, slop_level, slop_mode, is_favorite, created_at";

#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(db_path)?;
        migrate(&mut conn)?;
        info!(target: "store", path = %db_path.display(), "record store ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn migrate(conn: &mut Connection) -> Result<()> {
    let current: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = MIGRATIONS.len() as i64;

    if current > latest {
        return Err(SlopError::Config(format!(
            "database schema version {current} is newer than this build supports ({latest})"
        )));
    }

    for (index, step) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = index as i64 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(step)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        debug!(target: "store", version, "schema migration applied");
    }

    Ok(())
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SlopRecord> {
    let original: String = row.get(1)?;
    let slop: String = row.get(2)?;
    let level: String = row.get(4)?;
    let mode: String = row.get(5)?;
    let created_at: String = row.get(7)?;

    Ok(SlopRecord {
        id: row.get(0)?,
        original_path: PathBuf::from(original),
        slop_path: PathBuf::from(slop),
        caption: row.get(3)?,
        level: level.parse().map_err(|err| conversion_error(4, err))?,
        mode: mode.parse().map_err(|err| conversion_error(5, err))?,
        is_favorite: row.get::<_, i64>(6)? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|err| conversion_error(7, err))?
            .with_timezone(&Utc),
    })
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, result: &PipelineResult, mode: GenerationMode) -> Result<i64> {
        let created_at = utc_rfc3339(&now_utc());
        let conn = self.conn();
        conn.execute(
            "INSERT INTO slops (original_uri, slop_uri, caption, slop_level, slop_mode, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                result.original_path.to_string_lossy(),
                result.slop_path.to_string_lossy(),
                result.caption,
                result.level.key(),
                mode.key(),
                created_at,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(target: "store", id, %mode, "slop inserted");
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<Option<SlopRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!("SELECT {COLUMNS} FROM slops WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn list(&self, favorites_only: bool) -> Result<Vec<SlopRecord>> {
        let filter = if favorites_only {
            "WHERE is_favorite = 1"
        } else {
            ""
        };
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM slops {filter} ORDER BY created_at DESC, id DESC"
        ))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn update_caption(&self, id: i64, caption: &str) -> Result<()> {
        let caption = caption.trim();
        if caption.is_empty() {
            return Err(SlopError::InvalidInput("caption must not be empty".to_string()));
        }

        let changed = self.conn().execute(
            "UPDATE slops SET caption = ?1 WHERE id = ?2",
            params![caption, id],
        )?;
        if changed == 0 {
            return Err(SlopError::RecordNotFound(id));
        }
        Ok(())
    }

    fn toggle_favorite(&self, id: i64) -> Result<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE slops SET is_favorite = 1 - is_favorite WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Ok(false);
        }

        let state: i64 = conn.query_row(
            "SELECT is_favorite FROM slops WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(state != 0)
    }

    fn delete(&self, id: i64) -> Result<()> {
        self.conn()
            .execute("DELETE FROM slops WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.conn().execute("DELETE FROM slops", [])?;
        Ok(())
    }

    fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM slops", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn stats(&self) -> Result<SlopStats> {
        let conn = self.conn();
        let (total, favorites): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_favorite), 0) FROM slops",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let most_used: Option<String> = conn
            .query_row(
                "SELECT slop_mode FROM slops
                 GROUP BY slop_mode
                 ORDER BY COUNT(*) DESC, MAX(id) DESC
                 LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(SlopStats {
            total: total as u64,
            favorites: favorites as u64,
            most_used_mode: most_used.map(|mode| mode.parse()).transpose()?,
        })
    }
}
