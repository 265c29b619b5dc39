use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use log::{debug, info};
use serde::Serialize;
use tokio::time::Instant;

use super::DEFAULT_CACHE_TTL;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

type FillLocks = DashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// RAII handle on a key's fill lock.
///
/// Dropping it, including when the caller's future is cancelled, removes
/// the map entry once no other caller holds the lock.
struct FillLockRef<'a> {
    locks: &'a FillLocks,
    key: &'a str,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> FillLockRef<'a> {
    fn acquire(locks: &'a FillLocks, key: &'a str) -> Self {
        let lock = locks.entry(key.to_string()).or_default().clone();
        Self { locks, key, lock }
    }
}

impl Drop for FillLockRef<'_> {
    fn drop(&mut self) {
        // The map's reference and ours are the only ones left.
        self.locks.remove_if(self.key, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

/// Entry counts at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
}

/// In-memory TTL cache.
///
/// Entries are never evicted except by expiry: an expired entry is removed
/// when it is read or when [`cleanup_expired`](Self::cleanup_expired) runs.
/// Expiry uses tokio's clock so tests can drive it with a paused runtime.
pub struct CacheManager<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    fill_locks: FillLocks,
    default_ttl: Duration,
}

impl<V: Clone> Default for CacheManager<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl<V: Clone> CacheManager<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fill_locks: DashMap::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // A panic while holding the lock cannot leave an entry half-written.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries();
        let entry = entries.get(key)?;

        if entry.is_expired(Instant::now()) {
            entries.remove(key);
            debug!("Cache expired: {}", key);
            return None;
        }

        debug!("Cache hit: {}", key);
        Some(entry.value.clone())
    }

    /// Store a value; `ttl` defaults to the cache-wide TTL.
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries().insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        debug!("Cache set: {} (ttl={}s)", key, ttl.as_secs());
    }

    pub fn delete(&self, key: &str) -> bool {
        let removed = self.entries().remove(key).is_some();
        if removed {
            debug!("Cache deleted: {}", key);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries().clear();
        info!("Cache cleared");
    }

    /// Remove every expired entry and return how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            info!("Cleaned up {} expired cache entries", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();

        CacheStats {
            total_entries: entries.len(),
            active_entries: entries.len() - expired,
            expired_entries: expired,
        }
    }

    /// Read `key`, or run `fetch` and store its result.
    ///
    /// Concurrent fills of the same key are serialized: one caller runs
    /// `fetch`, the others wait and then read what it stored. `None`
    /// results are not cached, so the next caller fetches again.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, ttl: Option<Duration>, fetch: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        if let Some(value) = self.get(key) {
            return Some(value);
        }

        let fill_lock = FillLockRef::acquire(&self.fill_locks, key);
        let _guard = fill_lock.lock.lock().await;

        // Another caller may have filled the key while we waited.
        if let Some(value) = self.get(key) {
            return Some(value);
        }

        let fetched = fetch().await;
        if let Some(value) = &fetched {
            self.set(key, value.clone(), ttl);
        }
        fetched
    }
}
