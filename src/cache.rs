//! Short-lived cache for word-count aggregations.
//!
//! Aggregations are keyed by source, date range and shift. Entries expire after
//! a TTL and the least recently used entry is evicted once capacity is reached.
//! The cache is an ordinary value owned by the caller; nothing is global.

use crate::words::WordCounts;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Channel or folder the transcripts come from.
    pub source_id: String,
    pub start_date: String,
    pub end_date: String,
    pub shift_id: Option<String>,
}

impl CacheKey {
    pub fn new(
        source_id: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        shift_id: Option<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            shift_id,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    counts: Arc<WordCounts>,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct WordCountCache {
    ttl: Duration,
    entries: LruCache<CacheKey, CacheEntry>,
}

impl Default for WordCountCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl WordCountCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: LruCache::new(capacity),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<WordCounts>> {
        self.get_at(key, Instant::now())
    }

    /// Look up `key` as of `now`. Expired entries are removed on access.
    pub fn get_at(&mut self, key: &CacheKey, now: Instant) -> Option<Arc<WordCounts>> {
        let expired = match self.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                return Some(Arc::clone(&entry.counts));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.pop(key);
            tracing::trace!(source = %key.source_id, "word count cache entry expired");
        }
        None
    }

    pub fn insert(&mut self, key: CacheKey, counts: WordCounts) -> Arc<WordCounts> {
        self.insert_at(key, counts, Instant::now())
    }

    pub fn insert_at(&mut self, key: CacheKey, counts: WordCounts, now: Instant) -> Arc<WordCounts> {
        let counts = Arc::new(counts);
        self.entries.put(
            key,
            CacheEntry {
                counts: Arc::clone(&counts),
                stored_at: now,
            },
        );
        counts
    }

    /// Return the cached counts for `key`, calling `fetch` on a miss. Fetch
    /// errors are passed through and nothing is stored.
    pub fn get_or_fetch<E>(
        &mut self,
        key: CacheKey,
        fetch: impl FnOnce(&CacheKey) -> Result<WordCounts, E>,
    ) -> Result<Arc<WordCounts>, E> {
        let now = Instant::now();
        if let Some(hit) = self.get_at(&key, now) {
            return Ok(hit);
        }
        let counts = fetch(&key)?;
        tracing::debug!(source = %key.source_id, words = counts.len(), "cached word counts");
        Ok(self.insert_at(key, counts, now))
    }

    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.pop(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(source: &str) -> CacheKey {
        CacheKey::new(source, "2024-05-01", "2024-05-07", Some("morning".to_string()))
    }

    fn counts(word: &str, count: u32) -> WordCounts {
        [(word, count)].into_iter().collect()
    }

    #[test]
    fn hit_within_ttl() {
        let mut cache = WordCountCache::new(Duration::from_secs(60), 4);
        let start = Instant::now();
        cache.insert_at(key("kqed"), counts("fog", 3), start);
        let hit = cache.get_at(&key("kqed"), start + Duration::from_secs(59));
        assert_eq!(hit.unwrap().get("fog"), Some(3));
    }

    #[test]
    fn expired_entries_are_evicted() {
        let mut cache = WordCountCache::new(Duration::from_secs(60), 4);
        let start = Instant::now();
        cache.insert_at(key("kqed"), counts("fog", 3), start);
        assert!(cache.get_at(&key("kqed"), start + Duration::from_secs(60)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn shift_is_part_of_the_key() {
        let mut cache = WordCountCache::default();
        cache.insert(key("kqed"), counts("fog", 3));
        let other_shift = CacheKey::new("kqed", "2024-05-01", "2024-05-07", None);
        assert!(cache.get(&other_shift).is_none());
        assert!(cache.get(&key("kqed")).is_some());
    }

    #[test]
    fn least_recently_used_entry_is_dropped() {
        let mut cache = WordCountCache::new(DEFAULT_TTL, 2);
        cache.insert(key("a"), counts("one", 1));
        cache.insert(key("b"), counts("two", 2));
        assert!(cache.get(&key("a")).is_some());
        cache.insert(key("c"), counts("three", 3));
        assert!(cache.get(&key("b")).is_none());
        assert!(cache.get(&key("a")).is_some());
        assert!(cache.get(&key("c")).is_some());
    }

    #[test]
    fn get_or_fetch_only_fetches_on_miss() {
        let mut cache = WordCountCache::default();
        let mut calls = 0;
        for _ in 0..3 {
            let result: Result<_, String> = cache.get_or_fetch(key("wnyc"), |_| {
                calls += 1;
                Ok(counts("traffic", 8))
            });
            assert_eq!(result.unwrap().get("traffic"), Some(8));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn fetch_errors_are_not_cached() {
        let mut cache = WordCountCache::default();
        let failed: Result<_, &str> = cache.get_or_fetch(key("wnyc"), |_| Err("offline"));
        assert_eq!(failed.unwrap_err(), "offline");
        assert!(cache.is_empty());
        assert!(!cache.invalidate(&key("wnyc")));
    }
}
