//! SQLite-backed show store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::store::validate_episode_number;
use super::{
    CategoryStore, CreateShowRequest, EpisodeRecord, SettingsStore, ShowError, ShowStatus,
    ShowStore, TrackedShow,
};

const SHOW_COLUMNS: &str = "id, title, source_url, image_url, current_episode, total_episodes, \
     status, has_new_episode, last_checked, date_added, notes";

/// SQLite-backed show store.
///
/// Also holds the category list and user settings so a single database
/// file carries all persisted state.
pub struct SqliteShowStore {
    conn: Mutex<Connection>,
}

impl SqliteShowStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn new(path: &Path) -> Result<Self, ShowError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, ShowError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ShowError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS shows (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                source_url TEXT NOT NULL UNIQUE,
                image_url TEXT,
                current_episode INTEGER NOT NULL DEFAULT 0,
                total_episodes INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'watching',
                last_checked TEXT,
                date_added TEXT NOT NULL,
                notes TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_shows_title ON shows(title);

            CREATE TABLE IF NOT EXISTS episodes (
                show_id TEXT NOT NULL REFERENCES shows(id) ON DELETE CASCADE,
                episode_number INTEGER NOT NULL,
                watched_at TEXT NOT NULL,
                rating INTEGER,
                notes TEXT,
                UNIQUE(show_id, episode_number)
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS categories (
                name TEXT PRIMARY KEY,
                date_added TEXT NOT NULL
            );
            "#,
        )
        .map_err(db_err)?;

        // Migration: add has_new_episode column if it doesn't exist
        let _ = conn.execute(
            "ALTER TABLE shows ADD COLUMN has_new_episode INTEGER NOT NULL DEFAULT 0",
            [],
        );

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ShowError> {
        self.conn
            .lock()
            .map_err(|_| ShowError::Database("connection mutex poisoned".to_string()))
    }

    fn load(conn: &Connection, id: &str) -> Result<Option<TrackedShow>, ShowError> {
        conn.query_row(
            &format!("SELECT {} FROM shows WHERE id = ?", SHOW_COLUMNS),
            params![id],
            Self::row_to_show,
        )
        .optional()
        .map_err(db_err)
    }

    fn load_existing(conn: &Connection, id: &str) -> Result<TrackedShow, ShowError> {
        Self::load(conn, id)?.ok_or_else(|| ShowError::NotFound(id.to_string()))
    }

    fn query_shows(conn: &Connection, sql: &str) -> Result<Vec<TrackedShow>, ShowError> {
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let shows = stmt
            .query_map([], Self::row_to_show)
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(shows)
    }

    fn row_to_show(row: &rusqlite::Row) -> rusqlite::Result<TrackedShow> {
        let status_str: String = row.get(6)?;
        let last_checked_str: Option<String> = row.get(8)?;
        let date_added_str: String = row.get(9)?;

        Ok(TrackedShow {
            id: row.get(0)?,
            title: row.get(1)?,
            source_url: row.get(2)?,
            image_url: row.get(3)?,
            current_episode: row.get(4)?,
            total_episodes: row.get(5)?,
            status: status_str.parse().unwrap_or_default(),
            has_new_episode: row.get(7)?,
            last_checked: last_checked_str.as_deref().and_then(parse_timestamp),
            date_added: parse_timestamp(&date_added_str).unwrap_or_else(Utc::now),
            notes: row.get(10)?,
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<EpisodeRecord> {
        let watched_at_str: String = row.get(2)?;
        Ok(EpisodeRecord {
            show_id: row.get(0)?,
            episode_number: row.get(1)?,
            watched_at: parse_timestamp(&watched_at_str).unwrap_or_else(Utc::now),
            rating: row.get(3)?,
            notes: row.get(4)?,
        })
    }
}

fn db_err(e: rusqlite::Error) -> ShowError {
    ShowError::Database(e.to_string())
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

impl ShowStore for SqliteShowStore {
    fn create(&self, request: CreateShowRequest) -> Result<TrackedShow, ShowError> {
        validate_episode_number("current_episode", request.current_episode)?;
        validate_episode_number("total_episodes", request.total_episodes)?;

        let conn = self.lock()?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        // Progress recorded at creation time still follows the completion rule.
        let status = if request.total_episodes > 0
            && request.current_episode >= request.total_episodes
        {
            ShowStatus::Completed
        } else {
            request.status
        };

        conn.execute(
            "INSERT INTO shows (id, title, source_url, image_url, current_episode, total_episodes, status, has_new_episode, last_checked, date_added, notes) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)",
            params![
                id,
                request.title,
                request.source_url,
                request.image_url,
                request.current_episode,
                request.total_episodes,
                status.as_str(),
                request.last_checked.map(|t| t.to_rfc3339()),
                now.to_rfc3339(),
                request.notes,
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                ShowError::Duplicate(request.source_url.clone())
            } else {
                db_err(e)
            }
        })?;

        Ok(TrackedShow {
            id,
            title: request.title,
            source_url: request.source_url,
            image_url: request.image_url,
            current_episode: request.current_episode,
            total_episodes: request.total_episodes,
            status,
            has_new_episode: false,
            last_checked: request.last_checked,
            date_added: now,
            notes: request.notes,
        })
    }

    fn get(&self, id: &str) -> Result<Option<TrackedShow>, ShowError> {
        let conn = self.lock()?;
        Self::load(&conn, id)
    }

    fn get_by_url(&self, source_url: &str) -> Result<Option<TrackedShow>, ShowError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {} FROM shows WHERE source_url = ?", SHOW_COLUMNS),
            params![source_url],
            Self::row_to_show,
        )
        .optional()
        .map_err(db_err)
    }

    fn list(&self) -> Result<Vec<TrackedShow>, ShowError> {
        let conn = self.lock()?;
        Self::query_shows(
            &conn,
            &format!(
                "SELECT {} FROM shows ORDER BY has_new_episode DESC, title ASC",
                SHOW_COLUMNS
            ),
        )
    }

    fn find_pending_check(&self) -> Result<Vec<TrackedShow>, ShowError> {
        let conn = self.lock()?;
        Self::query_shows(
            &conn,
            &format!(
                "SELECT {} FROM shows WHERE has_new_episode = 0 ORDER BY title ASC",
                SHOW_COLUMNS
            ),
        )
    }

    fn set_has_new_episode(&self, id: &str, has_new_episode: bool) -> Result<(), ShowError> {
        let conn = self.lock()?;
        let show = Self::load_existing(&conn, id)?;

        if has_new_episode && !show.can_have_new_episode() {
            tracing::debug!(show_id = id, "Not flagging completed show");
            return Ok(());
        }

        conn.execute(
            "UPDATE shows SET has_new_episode = ? WHERE id = ?",
            params![has_new_episode, id],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn set_last_checked(&self, id: &str, checked_at: DateTime<Utc>) -> Result<(), ShowError> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE shows SET last_checked = ? WHERE id = ?",
                params![checked_at.to_rfc3339(), id],
            )
            .map_err(db_err)?;
        if updated == 0 {
            return Err(ShowError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn set_current_episode(&self, id: &str, episode: u32) -> Result<TrackedShow, ShowError> {
        validate_episode_number("current_episode", episode)?;

        let conn = self.lock()?;
        let show = Self::load_existing(&conn, id)?;
        let status = show.status_for_progress(episode);

        conn.execute(
            "UPDATE shows SET current_episode = ?, status = ? WHERE id = ?",
            params![episode, status.as_str(), id],
        )
        .map_err(db_err)?;

        Ok(TrackedShow {
            current_episode: episode,
            status,
            ..show
        })
    }

    fn set_status(&self, id: &str, status: ShowStatus) -> Result<TrackedShow, ShowError> {
        let conn = self.lock()?;
        let show = Self::load_existing(&conn, id)?;

        conn.execute(
            "UPDATE shows SET status = ? WHERE id = ?",
            params![status.as_str(), id],
        )
        .map_err(db_err)?;

        Ok(TrackedShow { status, ..show })
    }

    fn delete(&self, id: &str) -> Result<(), ShowError> {
        let conn = self.lock()?;
        let deleted = conn
            .execute("DELETE FROM shows WHERE id = ?", params![id])
            .map_err(db_err)?;
        if deleted == 0 {
            return Err(ShowError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn record_episode_watched(
        &self,
        id: &str,
        episode: u32,
        rating: Option<u8>,
        notes: Option<String>,
    ) -> Result<EpisodeRecord, ShowError> {
        validate_episode_number("episode_number", episode)?;
        if let Some(r) = rating {
            if !(1..=10).contains(&r) {
                return Err(ShowError::Validation(format!(
                    "rating must be between 1 and 10, got {}",
                    r
                )));
            }
        }

        let conn = self.lock()?;
        Self::load_existing(&conn, id)?;

        let now = Utc::now();
        conn.execute(
            "INSERT INTO episodes (show_id, episode_number, watched_at, rating, notes) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(show_id, episode_number) DO UPDATE SET watched_at = excluded.watched_at, rating = excluded.rating, notes = excluded.notes",
            params![id, episode, now.to_rfc3339(), rating, notes],
        )
        .map_err(db_err)?;

        Ok(EpisodeRecord {
            show_id: id.to_string(),
            episode_number: episode,
            watched_at: now,
            rating,
            notes,
        })
    }

    fn episode_records(&self, id: &str) -> Result<Vec<EpisodeRecord>, ShowError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT show_id, episode_number, watched_at, rating, notes FROM episodes WHERE show_id = ? ORDER BY episode_number ASC",
            )
            .map_err(db_err)?;
        let records = stmt
            .query_map(params![id], Self::row_to_record)
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(records)
    }
}

impl CategoryStore for SqliteShowStore {
    fn categories(&self) -> Result<Vec<String>, ShowError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT name FROM categories ORDER BY name ASC")
            .map_err(db_err)?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(db_err)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(db_err)?;
        Ok(names)
    }

    fn replace_categories(&self, categories: &[String]) -> Result<(), ShowError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;
        let now = Utc::now().to_rfc3339();

        tx.execute("DELETE FROM categories", []).map_err(db_err)?;
        for name in categories {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name, date_added) VALUES (?, ?)",
                params![name, now],
            )
            .map_err(db_err)?;
        }
        tx.commit().map_err(db_err)
    }
}

impl SettingsStore for SqliteShowStore {
    fn get_setting(&self, key: &str) -> Result<Option<String>, ShowError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_err)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), ShowError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(db_err)?;
        Ok(())
    }
}
