//! Short-lived read cache for git queries.
//!
//! Collapses bursts of identical blame/log queries into one git invocation.
//! - Entries expire after a fixed TTL
//! - Entries recorded against an older HEAD are treated as misses
//! - `invalidate_all` drops everything (called when a file is saved)
//! - At most `capacity` entries are kept; the least recently used goes first
//!
//! Values are cloned out on every hit, so callers never share an instance.
//! Concurrent writers for the same key overwrite each other; the last one wins.
//!
//! Used by: `GitService` for `blame_for_line` and `log_for_repo`

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::Serialize;

use crate::config::DEFAULT_CACHE_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlameKey {
    pub repo_path: String,
    pub sha: String,
    pub file_path: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogKey {
    pub repo_path: String,
    pub reference: String,
    pub max_count: Option<usize>,
    pub detail: LogDetail,
}

/// How much of each commit a repository log loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogDetail {
    /// Header fields only; `file_statuses` stays empty
    #[default]
    Shallow,
    /// Also diff each commit against its first parent for `file_statuses`
    Files,
}

struct CachedEntry<V> {
    value: V,
    head: Option<String>,
    inserted_at: Instant,
}

pub struct ReadCache<K, V> {
    entries: Mutex<LruCache<K, CachedEntry<V>>>,
    ttl: Duration,
}

impl<K, V> ReadCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CACHE_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, CachedEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached value for `key`, if it is younger than the TTL and was recorded
    /// while HEAD pointed at `head`. Expired and stale entries are dropped.
    pub fn get(&self, key: &K, head: Option<&str>) -> Option<V> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() > self.ttl || entry.head.as_deref() != head {
            entries.pop(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: K, head: Option<String>, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.lock();
        if entries.len() == entries.cap().get() && !entries.contains(&key) {
            tracing::trace!(
                capacity = entries.len(),
                "read cache full, evicting least recently used entry"
            );
        }
        entries.put(
            key,
            CachedEntry {
                value,
                head,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        if !entries.is_empty() {
            tracing::debug!(entries = entries.len(), "invalidating read cache");
        }
        entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        CacheStats {
            entries: entries.len(),
            capacity: entries.cap().get(),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl_secs: u64,
}
