//! Time-boxed cache of top-N leaderboard queries
//!
//! One entry per requested limit. Entries expire after a fixed TTL and are
//! all dropped on every write. No LRU: the key space is a handful of page
//! sizes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::Winner;

#[derive(Debug, Clone)]
struct CachedPage {
    winners: Arc<[Winner]>,
    expires_at: Instant,
}

/// Top-N results keyed by N. Safe to share across threads; lookups only
/// take the read lock unless they have to evict.
#[derive(Debug)]
pub struct ScoreCache {
    ttl: Duration,
    pages: RwLock<HashMap<usize, CachedPage>>,
}

impl ScoreCache {
    /// A zero TTL disables caching: every lookup misses.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pages: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, limit: usize) -> Option<Arc<[Winner]>> {
        self.get_at(limit, Instant::now())
    }

    pub fn set(&self, limit: usize, winners: Arc<[Winner]>) {
        self.set_at(limit, winners, Instant::now());
    }

    /// Drop every cached page
    pub fn invalidate_all(&self) {
        match self.pages.write() {
            Ok(mut pages) => pages.clear(),
            // A panicked writer may have left a half-built map; start over.
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Number of pages currently held (expired ones included until looked up)
    pub fn len(&self) -> usize {
        self.pages.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn get_at(&self, limit: usize, now: Instant) -> Option<Arc<[Winner]>> {
        {
            let pages = self.pages.read().ok()?;
            let page = pages.get(&limit)?;
            if now < page.expires_at {
                return Some(Arc::clone(&page.winners));
            }
        }

        // Expired: evict, unless a fresher page was stored meanwhile
        if let Ok(mut pages) = self.pages.write() {
            if pages.get(&limit).is_some_and(|p| now >= p.expires_at) {
                pages.remove(&limit);
                log::debug!("Evicted expired top-{} page", limit);
            }
        }
        None
    }

    pub(crate) fn set_at(&self, limit: usize, winners: Arc<[Winner]>, now: Instant) {
        let page = CachedPage {
            winners,
            expires_at: now + self.ttl,
        };
        if let Ok(mut pages) = self.pages.write() {
            pages.insert(limit, page);
        }
    }
}
