//! Durable frontier for resumable crawls, kept in the crawl storage folder.

use crate::domain::error::DomainError;
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

pub const FRONTIER_DB_FILE: &str = "frontier.db";

const PENDING: &str = "pending";
const DONE: &str = "done";

/// What a previous run left behind.
#[derive(Debug, Default)]
pub struct SavedFrontier {
    /// Scheduled but never fetched, in discovery order.
    pub pending: Vec<(String, u32)>,
    /// Every URL ever scheduled, fetched or not.
    pub seen: Vec<String>,
}

pub struct FrontierStore {
    conn: Mutex<Connection>,
}

impl FrontierStore {
    /// Open (or create) the store inside `folder`.
    pub fn open(folder: &Path) -> Result<Self, DomainError> {
        std::fs::create_dir_all(folder).map_err(|e| {
            DomainError::Config(format!(
                "cannot create crawl storage folder {}: {e}",
                folder.display()
            ))
        })?;
        let conn = Connection::open(folder.join(FRONTIER_DB_FILE))
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DomainError> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    /// Record a newly scheduled URL. Already known URLs are left untouched.
    pub fn insert_pending(&self, url: &str, depth: u32) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO frontier (url, depth, status, discovered_at) VALUES (?1, ?2, ?3, ?4)",
            params![url, depth, PENDING, Utc::now().to_rfc3339()],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save frontier url: {e}")))?;
        Ok(())
    }

    pub fn mark_done(&self, url: &str) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE frontier SET status = ?1, fetched_at = ?2 WHERE url = ?3",
            params![DONE, Utc::now().to_rfc3339(), url],
        )
        .map_err(|e| DomainError::Database(format!("Failed to update frontier url: {e}")))?;
        Ok(())
    }

    pub fn load(&self) -> Result<SavedFrontier, DomainError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT url, depth FROM frontier WHERE status = ?1 ORDER BY rowid")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let pending = stmt
            .query_map(params![PENDING], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        let mut stmt = conn
            .prepare("SELECT url FROM frontier ORDER BY rowid")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let seen = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(SavedFrontier { pending, seen })
    }

    pub fn clear(&self) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM frontier", [])
            .map_err(|e| DomainError::Database(format!("Failed to clear frontier: {e}")))?;
        Ok(())
    }
}
