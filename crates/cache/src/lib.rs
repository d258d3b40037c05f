mod clock;

pub use clock::{Clock, SystemClock};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;

use dashmap::DashMap;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Keyed storage where every entry carries its own time to live.
///
/// The expiration of an entry is computed from its last write. Reading an
/// entry never extends its lifetime.
pub trait Cache<V>: Send + Sync {
    /// Returns the live value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Inserts or overwrites the value stored under `key`.
    fn set(&self, key: &str, value: V, ttl: Duration);

    /// Removes the value stored under `key`, returning it if it was live.
    fn delete(&self, key: &str) -> Option<V>;
}

struct Entry<V> {
    value: V,
    // None when the TTL reaches past the range of `Instant`
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Process-local [`Cache`] backed by a sharded concurrent map.
pub struct InMemoryCache<V> {
    entries: DashMap<String, Entry<V>>,
    clock: Arc<dyn Clock>,
}

impl<V> Default for InMemoryCache<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> InMemoryCache<V>
where
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Drops every expired entry and returns how many were evicted.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::debug!(evicted, "purged expired cache entries");
        }

        evicted
    }

    /// Number of stored entries, expired ones not yet purged included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Cache<V> for InMemoryCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();

        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }

        None
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = self.clock.now().checked_add(ttl);
        self.entries
            .insert(key.to_owned(), Entry { value, expires_at });
    }

    fn delete(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        self.entries
            .remove(key)
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(_, entry)| entry.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn setup() -> (Arc<ManualClock>, InMemoryCache<String>) {
        let clock = Arc::new(ManualClock::new());
        let cache = InMemoryCache::with_clock(clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_set_then_get() {
        let (_, cache) = setup();

        cache.set("alice", "pending".to_owned(), TTL);

        assert_eq!(cache.get("alice"), Some("pending".to_owned()));
        assert_eq!(cache.get("bob"), None);
    }

    #[test]
    fn test_overwrite_keeps_last_value() {
        let (_, cache) = setup();

        cache.set("alice", "pending".to_owned(), TTL);
        cache.set("alice", "verified".to_owned(), TTL);

        assert_eq!(cache.get("alice"), Some("verified".to_owned()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (clock, cache) = setup();
        cache.set("alice", "pending".to_owned(), TTL);

        clock.advance(TTL - Duration::from_secs(1));
        assert!(cache.get("alice").is_some());

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("alice"), None);

        // Expired entries are evicted on read
        assert!(cache.is_empty());
    }

    #[test]
    fn test_read_does_not_extend_ttl() {
        let (clock, cache) = setup();
        cache.set("alice", "pending".to_owned(), TTL);

        for _ in 0..5 {
            clock.advance(Duration::from_secs(10));
            assert!(cache.get("alice").is_some());
        }

        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get("alice"), None);
    }

    #[test]
    fn test_write_restarts_ttl() {
        let (clock, cache) = setup();
        cache.set("alice", "pending".to_owned(), TTL);

        clock.advance(Duration::from_secs(50));
        cache.set("alice", "verified".to_owned(), TTL);

        clock.advance(Duration::from_secs(50));
        assert_eq!(cache.get("alice"), Some("verified".to_owned()));
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let (clock, cache) = setup();
        cache.set("alice", "pending".to_owned(), Duration::from_secs(u64::MAX));

        clock.advance(Duration::from_secs(100 * 365 * 24 * 60 * 60));
        assert_eq!(cache.get("alice"), Some("pending".to_owned()));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_delete() {
        let (clock, cache) = setup();
        cache.set("alice", "pending".to_owned(), TTL);
        cache.set("bob", "pending".to_owned(), TTL);

        assert_eq!(cache.delete("alice"), Some("pending".to_owned()));
        assert_eq!(cache.get("alice"), None);

        clock.advance(TTL);
        assert_eq!(cache.delete("bob"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let (clock, cache) = setup();
        cache.set("short", "a".to_owned(), Duration::from_secs(10));
        cache.set("long", "b".to_owned(), TTL);

        clock.advance(Duration::from_secs(30));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long"), Some("b".to_owned()));
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_entries() {
        let cache = Arc::new(InMemoryCache::<usize>::new());

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let cache = cache.clone();
                scope.spawn(move || {
                    for i in 0..250 {
                        let key = format!("{worker}-{i}");
                        cache.set(&key, i, TTL);
                        assert_eq!(cache.get(&key), Some(i));
                    }
                });
            }
        });

        assert_eq!(cache.len(), 8 * 250);
    }
}
