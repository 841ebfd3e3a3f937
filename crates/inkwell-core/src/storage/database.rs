//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - One writing session per calendar day (completed or interrupted)
//! - Key-value store for application state (premium flag)

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::DatabaseError;
use crate::history::PremiumStatus;
use crate::session::{MoodLevel, Session, SessionId, SessionPatch, SessionStatus};

use super::data_dir;
use super::repository::SessionRepository;

const PREMIUM_KEY: &str = "license_valid";

const SESSION_COLUMNS: &str =
    "id, date, text, word_count, duration_ms, status, mood, mood_note, created_at, completed_at";

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

/// Row as stored, before text columns are parsed.
struct RawSession {
    id: i64,
    date: String,
    text: String,
    word_count: i64,
    duration_ms: i64,
    status: String,
    mood: Option<u8>,
    mood_note: Option<String>,
    created_at: String,
    completed_at: Option<String>,
}

impl RawSession {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            text: row.get(2)?,
            word_count: row.get(3)?,
            duration_ms: row.get(4)?,
            status: row.get(5)?,
            mood: row.get(6)?,
            mood_note: row.get(7)?,
            created_at: row.get(8)?,
            completed_at: row.get(9)?,
        })
    }

    fn into_session(self) -> Result<Session, DatabaseError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::Corrupt(format!("date '{}': {e}", self.date)))?;
        let status = self
            .status
            .parse::<SessionStatus>()
            .map_err(DatabaseError::Corrupt)?;
        let mood = self
            .mood
            .map(MoodLevel::try_from)
            .transpose()
            .map_err(DatabaseError::Corrupt)?;
        let completed_at = self.completed_at.as_deref().map(parse_timestamp).transpose()?;
        Ok(Session {
            id: Some(SessionId(self.id)),
            date,
            text: self.text,
            word_count: usize::try_from(self.word_count).unwrap_or(0),
            duration_ms: u64::try_from(self.duration_ms).unwrap_or(0),
            status,
            mood,
            mood_note: self.mood_note,
            created_at: parse_timestamp(&self.created_at)?,
            completed_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Corrupt(format!("timestamp '{raw}': {e}")))
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Database {
    /// Open the database at `<data_dir>/inkwell.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()?.join("inkwell.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                date         TEXT NOT NULL,
                text         TEXT NOT NULL DEFAULT '',
                word_count   INTEGER NOT NULL,
                duration_ms  INTEGER NOT NULL,
                status       TEXT NOT NULL,
                mood         INTEGER,
                mood_note    TEXT,
                created_at   TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);
            CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status);",
        )?;
        Ok(())
    }

    fn query_sessions(
        &self,
        sql: &str,
        args: impl rusqlite::Params,
    ) -> Result<Vec<Session>, DatabaseError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, RawSession::from_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    /// Interrupted sessions, newest first.
    pub fn drafts(&self) -> Result<Vec<Session>, DatabaseError> {
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE status = 'interrupted' ORDER BY date DESC"
            ),
            params![],
        )
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Record whether premium history access is unlocked.
    pub fn set_premium_status(&self, valid: bool) -> Result<(), DatabaseError> {
        if valid {
            self.kv_set(PREMIUM_KEY, "true")
        } else {
            self.kv_delete(PREMIUM_KEY)
        }
    }
}

impl SessionRepository for Database {
    fn get_by_date(&self, date: NaiveDate) -> Result<Option<Session>, DatabaseError> {
        let mut found = self.query_sessions(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE date = ?1"),
            params![date_key(date)],
        )?;
        Ok(found.pop())
    }

    fn save(&self, session: &Session) -> Result<SessionId, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT status FROM sessions WHERE date = ?1",
                params![date_key(session.date)],
                |row| row.get(0),
            )
            .optional()?;
        match existing.as_deref() {
            Some("completed") => return Err(DatabaseError::DateCompleted(session.date)),
            Some(_) => {
                tx.execute(
                    "DELETE FROM sessions WHERE date = ?1",
                    params![date_key(session.date)],
                )?;
            }
            None => {}
        }
        tx.execute(
            "INSERT INTO sessions (date, text, word_count, duration_ms, status, mood, mood_note, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                date_key(session.date),
                session.text,
                session.word_count as i64,
                session.duration_ms as i64,
                session.status.as_str(),
                session.mood.map(u8::from),
                session.mood_note,
                session.created_at.to_rfc3339(),
                session.completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(SessionId(id))
    }

    fn update(&self, id: SessionId, patch: &SessionPatch) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE sessions
             SET mood = COALESCE(?2, mood), mood_note = COALESCE(?3, mood_note)
             WHERE id = ?1",
            params![id.0, patch.mood.map(u8::from), patch.mood_note],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(id.0));
        }
        Ok(())
    }

    fn get_all_completed(&self) -> Result<Vec<Session>, DatabaseError> {
        self.query_sessions(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE status = 'completed'"),
            params![],
        )
    }

    fn get_all(&self) -> Result<Vec<Session>, DatabaseError> {
        self.query_sessions(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions ORDER BY date DESC"),
            params![],
        )
    }
}

impl PremiumStatus for Database {
    fn is_premium_active(&self) -> bool {
        match self.kv_get(PREMIUM_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!("premium flag unreadable, treating as free tier: {e}");
                false
            }
        }
    }
}
