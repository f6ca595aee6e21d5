//! SQLite winners table

use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use super::{Winner, WinnerBackend};
use crate::error::StoreError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS winners (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        score INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_winners_score ON winners(score DESC);
";

pub struct SqliteBackend {
    conn: Connection,
    label: String,
}

impl SqliteBackend {
    /// Open (or create) a database file. Calls blocked on a locked database
    /// give up after `timeout`.
    pub fn open(path: &str, timeout: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(timeout)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        log::info!("Opened SQLite leaderboard at {}", path);
        Ok(Self {
            conn,
            label: format!("sqlite:{path}"),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            label: "sqlite::memory:".to_string(),
        })
    }
}

impl WinnerBackend for SqliteBackend {
    fn insert(
        &mut self,
        name: &str,
        score: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Winner, StoreError> {
        self.conn.execute(
            "INSERT INTO winners (name, score, created_at) VALUES (?1, ?2, ?3)",
            params![name, score, created_at],
        )?;
        Ok(Winner {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            score: score.unsigned_abs(),
            created_at,
        })
    }

    fn top(&mut self, limit: usize) -> Result<Vec<Winner>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, score, created_at FROM winners
             ORDER BY score DESC, id ASC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let score: i64 = row.get(2)?;
            let score =
                u64::try_from(score).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(2, score))?;
            Ok(Winner {
                id: row.get(0)?,
                name: row.get(1)?,
                score,
                created_at: row.get(3)?,
            })
        })?;
        let winners = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(winners)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM winners", [])?;
        tx.commit()?;
        log::debug!("Deleted {} winners", deleted);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::from(e))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
