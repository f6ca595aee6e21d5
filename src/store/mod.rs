//! Leaderboard persistence
//!
//! An append-only winners table behind a pluggable backend (SQLite or a
//! JSON file), fronted by a TTL cache of top-N queries. The store is the
//! single authority on what a valid stored name looks like.
//!
//! Consistency: inserts, deletes and cache fills all run under the backend
//! lock, and writes invalidate the cache before releasing it. A top-N read
//! that starts after a write returns therefore always sees that write.

pub mod cache;
pub mod json;
pub mod sqlite;
pub mod worker;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_PLAYER_NAME, DEFAULT_TOP_N, MAX_NAME_CHARS};
use crate::error::StoreError;
use crate::settings::{Settings, StoreBackend};

pub use cache::ScoreCache;
pub use json::JsonBackend;
pub use sqlite::SqliteBackend;
pub use worker::{JobReport, StoreAction, StoreJob, StoreWorker};

/// A leaderboard entry. Never changed once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    /// Monotonic, assigned by the backend
    pub id: i64,
    pub name: String,
    pub score: u64,
    pub created_at: DateTime<Utc>,
}

/// Ranking order: score descending, then insertion order
pub fn rank_order(a: &Winner, b: &Winner) -> std::cmp::Ordering {
    b.score.cmp(&a.score).then(a.id.cmp(&b.id))
}

/// Normalize a player-supplied name: trimmed, control characters removed,
/// at most `MAX_NAME_CHARS` characters, never empty.
pub fn sanitize_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .chars()
        .take(MAX_NAME_CHARS)
        .collect();
    let name = name.trim_end();
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Durable medium holding the winners table
pub trait WinnerBackend: Send {
    /// Append a winner and return it with its assigned id
    fn insert(
        &mut self,
        name: &str,
        score: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Winner, StoreError>;

    /// Best `limit` winners in rank order
    fn top(&mut self, limit: usize) -> Result<Vec<Winner>, StoreError>;

    /// Delete every winner, all or nothing
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Release the medium
    fn close(self: Box<Self>) -> Result<(), StoreError>;

    fn describe(&self) -> String;
}

/// Cached, thread-safe leaderboard
pub struct LeaderboardStore {
    backend: Mutex<Option<Box<dyn WinnerBackend>>>,
    cache: ScoreCache,
}

impl std::fmt::Debug for LeaderboardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderboardStore")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl LeaderboardStore {
    pub fn new(backend: Box<dyn WinnerBackend>, cache: ScoreCache) -> Self {
        log::info!(
            "Leaderboard store ready ({}, cache ttl {:?})",
            backend.describe(),
            cache.ttl()
        );
        Self {
            backend: Mutex::new(Some(backend)),
            cache,
        }
    }

    /// Open the backend named in the settings
    pub fn open(settings: &Settings) -> Result<Self, StoreError> {
        let timeout = Duration::from_millis(settings.store_timeout_ms);
        let backend: Box<dyn WinnerBackend> = match settings.store_backend {
            StoreBackend::Sqlite => Box::new(SqliteBackend::open(&settings.db_path, timeout)?),
            StoreBackend::Json => Box::new(JsonBackend::open(&settings.db_path)?),
        };
        let cache = ScoreCache::new(Duration::from_secs(settings.cache_ttl_seconds));
        Ok(Self::new(backend, cache))
    }

    /// SQLite in memory (tests, demos)
    pub fn open_in_memory(cache_ttl: Duration) -> Result<Self, StoreError> {
        Ok(Self::new(
            Box::new(SqliteBackend::open_in_memory()?),
            ScoreCache::new(cache_ttl),
        ))
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    fn with_backend<T>(
        &self,
        f: impl FnOnce(&mut dyn WinnerBackend) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .backend
            .lock()
            .map_err(|_| StoreError::Unavailable("leaderboard lock poisoned".into()))?;
        let backend = guard.as_mut().ok_or(StoreError::Closed)?;
        f(backend.as_mut())
    }

    /// Record a finished run. Empty names become the default name.
    pub fn save_winner(&self, name: &str, score: u64) -> Result<Winner, StoreError> {
        let score = i64::try_from(score)
            .map_err(|_| StoreError::InvalidInput(format!("score {score} is out of range")))?;
        let name = sanitize_name(name);

        let winner = self.with_backend(|backend| {
            let winner = backend.insert(&name, score, Utc::now())?;
            self.cache.invalidate_all();
            Ok(winner)
        })?;
        log::info!(
            "Saved winner #{} {:?} with score {}",
            winner.id,
            winner.name,
            winner.score
        );
        Ok(winner)
    }

    /// Best `limit` winners, score descending then oldest first.
    /// A limit of 0 means the default page size.
    pub fn top_winners(&self, limit: usize) -> Result<Vec<Winner>, StoreError> {
        let limit = if limit == 0 { DEFAULT_TOP_N } else { limit };

        if let Some(page) = self.cache.get(limit) {
            log::debug!("Top-{} served from cache", limit);
            return Ok(page.to_vec());
        }

        log::debug!("Top-{} cache miss, reading store", limit);
        self.with_backend(|backend| {
            let mut winners = backend.top(limit)?;
            winners.sort_by(rank_order);
            winners.truncate(limit);
            let page: Arc<[Winner]> = winners.into();
            self.cache.set(limit, Arc::clone(&page));
            Ok(page.to_vec())
        })
    }

    /// Delete every winner
    pub fn reset(&self) -> Result<(), StoreError> {
        self.with_backend(|backend| {
            backend.clear()?;
            self.cache.invalidate_all();
            Ok(())
        })?;
        log::info!("Leaderboard reset");
        Ok(())
    }

    /// Release the backend. Later calls, including another `close`, fail
    /// with `StoreError::Closed`.
    pub fn close(&self) -> Result<(), StoreError> {
        let backend = {
            let mut guard = self
                .backend
                .lock()
                .map_err(|_| StoreError::Unavailable("leaderboard lock poisoned".into()))?;
            let backend = guard.take().ok_or(StoreError::Closed)?;
            self.cache.invalidate_all();
            backend
        };
        backend.close()?;
        log::info!("Leaderboard store closed");
        Ok(())
    }
}
