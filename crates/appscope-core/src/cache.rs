//! In-memory, TTL-bounded cache of extracted records.
//!
//! A single [`RwLock`] guards the map: lookups of popular identifiers take
//! the shared lock concurrently, inserts and evictions take it exclusively.
//! Entries expire lazily, on the read that finds them stale; there is no
//! background sweep and no capacity bound.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::AppRecord;
use crate::traits::{Clock, SystemClock};

/// Default time-to-live in seconds (6 hours).
pub const DEFAULT_TTL_SECS: i64 = 6 * 60 * 60;

/// A cached record and the moment it was stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    record: Arc<AppRecord>,
    created_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.created_at > ttl
    }
}

/// Thread-safe identifier → record cache with a fixed TTL.
///
/// Created once and shared (usually behind an `Arc`) by every lookup.
/// Callers only ever see `Arc<AppRecord>`, never the entry itself.
pub struct RecordCache {
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl RecordCache {
    pub fn new(ttl: TimeDelta) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached record, evicting it first if it has expired.
    pub fn get(&self, identifier: &str) -> Option<Arc<AppRecord>> {
        let now = self.clock.now();
        {
            let entries = self.read();
            match entries.get(identifier) {
                None => return None,
                Some(entry) if !entry.is_expired(now, self.ttl) => {
                    return Some(Arc::clone(&entry.record));
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent put may have refreshed it.
        let mut entries = self.write();
        match entries.get(identifier) {
            Some(entry) if !entry.is_expired(now, self.ttl) => Some(Arc::clone(&entry.record)),
            Some(_) => {
                entries.remove(identifier);
                tracing::debug!(%identifier, "Evicted expired cache entry");
                None
            }
            None => None,
        }
    }

    /// Store a record, replacing any previous entry for the identifier.
    pub fn put(&self, identifier: &str, record: Arc<AppRecord>) {
        let entry = CacheEntry {
            record,
            created_at: self.clock.now(),
        };
        self.write().insert(identifier.to_string(), entry);
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovered from poisoned cache lock");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovered from poisoned cache lock");
            poisoned.into_inner()
        })
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(DEFAULT_TTL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ManualClock, make_test_record};

    fn cache_with_clock() -> (RecordCache, ManualClock) {
        let clock = ManualClock::new();
        let cache = RecordCache::with_clock(TimeDelta::hours(6), Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_get_after_put_returns_same_record() {
        let (cache, _clock) = cache_with_clock();
        let record = Arc::new(make_test_record("com.test.app", "Test App"));

        cache.put("com.test.app", Arc::clone(&record));

        let cached = cache.get("com.test.app").unwrap();
        assert_eq!(*cached, *record);
        assert!(Arc::ptr_eq(&cached, &record));
    }

    #[test]
    fn test_missing_identifier_is_absent() {
        let (cache, _clock) = cache_with_clock();
        assert!(cache.get("com.unknown.app").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_expires_after_ttl_and_is_removed() {
        let (cache, clock) = cache_with_clock();
        cache.put(
            "com.test.app",
            Arc::new(make_test_record("com.test.app", "Test App")),
        );

        clock.advance(TimeDelta::hours(6) + TimeDelta::seconds(1));

        assert!(cache.get("com.test.app").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_entry_at_exact_ttl_is_still_fresh() {
        let (cache, clock) = cache_with_clock();
        cache.put(
            "com.test.app",
            Arc::new(make_test_record("com.test.app", "Test App")),
        );

        clock.advance(TimeDelta::hours(6));

        assert!(cache.get("com.test.app").is_some());
    }

    #[test]
    fn test_put_refreshes_timestamp() {
        let (cache, clock) = cache_with_clock();
        cache.put("com.a.app", Arc::new(make_test_record("com.a.app", "Old")));
        clock.advance(TimeDelta::hours(5));
        cache.put("com.a.app", Arc::new(make_test_record("com.a.app", "New")));
        clock.advance(TimeDelta::hours(5));

        let cached = cache.get("com.a.app").unwrap();
        assert_eq!(cached.title, "New");
    }

    #[test]
    fn test_expiry_only_touches_the_stale_identifier() {
        let (cache, clock) = cache_with_clock();
        cache.put("com.old.app", Arc::new(make_test_record("com.old.app", "Old")));
        clock.advance(TimeDelta::hours(4));
        cache.put("com.new.app", Arc::new(make_test_record("com.new.app", "New")));
        clock.advance(TimeDelta::hours(3));

        assert!(cache.get("com.old.app").is_none());
        assert!(cache.get("com.new.app").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(RecordCache::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let id = format!("com.app{}.test", i % 2);
                    for _ in 0..100 {
                        cache.put(&id, Arc::new(make_test_record(&id, "Concurrent")));
                        assert!(cache.get(&id).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 2);
    }
}
