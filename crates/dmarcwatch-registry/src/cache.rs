//! Key/value cache with per-entry expiry.
//!
//! Expiry is checked lazily on read: an entry is dead once
//! `now > expires_at`. Dead entries stay in memory until [`TtlCache::cleanup`]
//! or an overwrite reclaims them.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::clock::{Clock, SystemClock};

/// TTL used when a caller does not give one (60 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Per-entry TTL cache.
///
/// All methods take `&self`; single operations are atomic. `get_or_set`
/// additionally serializes computes per key, so concurrent callers on a
/// missing key run the compute once.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    computing: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &lock(&self.entries).len())
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache on the system clock with a 60-minute default TTL
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache on the given clock
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            computing: Mutex::new(HashMap::new()),
            clock,
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Set the TTL used when none is given
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// TTL used when none is given
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = self.deadline(ttl.unwrap_or(self.default_ttl));
        lock(&self.entries).insert(key, CacheEntry { value, expires_at });
    }

    /// Live value for `key`, if any
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        lock(&self.entries)
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Returns true if `key` holds a live value
    pub fn has(&self, key: &K) -> bool {
        let now = self.clock.now();
        lock(&self.entries)
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// Remove `key`; returns true if an entry (live or expired) was present
    pub fn delete(&self, key: &K) -> bool {
        lock(&self.entries).remove(key).is_some()
    }

    /// Remove every entry
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// Remove expired entries; returns how many were reclaimed
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Return the live value for `key`, or compute, store and return it.
    ///
    /// `compute` is not called when a live entry exists, and is called
    /// exactly once on a miss.
    pub async fn get_or_set<F, Fut>(&self, key: K, ttl: Option<Duration>, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let result = self
            .try_get_or_set(key, ttl, move || async move { Ok::<V, Infallible>(compute().await) })
            .await;
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible [`get_or_set`](Self::get_or_set). On error nothing is stored.
    pub async fn try_get_or_set<F, Fut, E>(
        &self,
        key: K,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let gate = self.compute_gate(&key);
        let result = {
            let _guard = gate.lock().await;

            // Another caller may have filled the entry while we waited.
            if let Some(value) = self.get(&key) {
                Ok(value)
            } else {
                debug!("cache miss, computing value");
                match compute().await {
                    Ok(value) => {
                        self.set(key.clone(), value.clone(), ttl);
                        Ok(value)
                    }
                    Err(e) => Err(e),
                }
            }
        };
        drop(gate);
        self.release_gate(&key);

        result
    }

    fn deadline(&self, ttl: Duration) -> DateTime<Utc> {
        let now = self.clock.now();
        TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn compute_gate(&self, key: &K) -> Arc<tokio::sync::Mutex<()>> {
        lock(&self.computing)
            .entry(key.clone())
            .or_default()
            .clone()
    }

    fn release_gate(&self, key: &K) {
        let mut computing = lock(&self.computing);
        if computing
            .get(key)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            computing.remove(key);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manual() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_set_get_delete() {
        let cache: TtlCache<String, u32> = TtlCache::new();
        cache.set("a".into(), 1, None);
        assert_eq!(cache.get(&"a".into()), Some(1));
        assert!(cache.has(&"a".into()));

        assert!(cache.delete(&"a".into()));
        assert!(!cache.delete(&"a".into()));
        assert_eq!(cache.get(&"a".into()), None);
    }

    #[test]
    fn test_expiry_is_lazy() {
        let clock = manual();
        let cache: TtlCache<&str, &str> = TtlCache::with_clock(clock.clone());
        cache.set("k", "v", Some(Duration::from_secs(30)));

        clock.advance(TimeDelta::seconds(30));
        assert_eq!(cache.get(&"k"), Some("v"), "live at the deadline itself");

        clock.advance(TimeDelta::milliseconds(1));
        assert_eq!(cache.get(&"k"), None);
        assert!(!cache.has(&"k"));
        assert_eq!(cache.len(), 1, "expired entry is still held until cleanup");
    }

    #[test]
    fn test_default_ttl_is_an_hour() {
        let clock = manual();
        let cache: TtlCache<&str, u8> = TtlCache::with_clock(clock.clone());
        assert_eq!(cache.default_ttl(), Duration::from_secs(3600));
        cache.set("k", 7, None);

        clock.advance(TimeDelta::minutes(59));
        assert!(cache.has(&"k"));
        clock.advance(TimeDelta::minutes(2));
        assert!(!cache.has(&"k"));
    }

    #[test]
    fn test_short_ttl_on_real_clock() {
        let cache: TtlCache<&str, &str> = TtlCache::new();
        // 0.01 minutes
        cache.set("k", "v", Some(Duration::from_millis(600)));
        assert_eq!(cache.get(&"k"), Some("v"));

        std::thread::sleep(Duration::from_millis(700));
        assert_eq!(cache.get(&"k"), None);
    }

    #[test]
    fn test_cleanup_reclaims_only_expired() {
        let clock = manual();
        let cache: TtlCache<&str, u8> = TtlCache::with_clock(clock.clone());
        cache.set("short", 1, Some(Duration::from_secs(10)));
        cache.set("long", 2, Some(Duration::from_secs(100)));
        cache.set("other", 3, Some(Duration::from_secs(5)));

        clock.advance(TimeDelta::seconds(20));
        assert_eq!(cache.cleanup(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"long"), Some(2));
        assert_eq!(cache.cleanup(), 0);
    }

    #[test]
    fn test_clear() {
        let cache: TtlCache<u8, u8> = TtlCache::new();
        cache.set(1, 1, None);
        cache.set(2, 2, None);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_set_skips_compute_on_hit() {
        let cache: TtlCache<&str, u32> = TtlCache::new();
        cache.set("k", 1, None);

        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let value = cache
            .get_or_set("k", None, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                99
            })
            .await;
        assert_eq!(value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_or_set_computes_once_on_miss() {
        let cache: TtlCache<&str, u32> = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..3 {
            let value = cache
                .get_or_set("k", None, move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    42
                })
                .await;
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&"k"), Some(42));
    }

    #[tokio::test]
    async fn test_get_or_set_recomputes_after_expiry() {
        let clock = manual();
        let cache: TtlCache<&str, u32> = TtlCache::with_clock(clock.clone());
        cache.set("k", 1, Some(Duration::from_secs(1)));
        clock.advance(TimeDelta::seconds(2));

        let value = cache
            .get_or_set("k", Some(Duration::from_secs(60)), || async { 2 })
            .await;
        assert_eq!(value, 2);
        clock.advance(TimeDelta::seconds(30));
        assert_eq!(cache.get(&"k"), Some(2));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_compute() {
        let cache: TtlCache<&str, u32> = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let compute = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            7
        };
        let (a, b) = tokio::join!(
            cache.get_or_set("k", None, compute),
            cache.get_or_set("k", None, compute),
        );
        assert_eq!((a, b), (7, 7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_try_get_or_set_does_not_store_errors() {
        let cache: TtlCache<&str, u32> = TtlCache::new();

        let err = cache
            .try_get_or_set("k", None, || async { Err::<u32, &str>("backend down") })
            .await;
        assert_eq!(err, Err("backend down"));
        assert!(!cache.has(&"k"));

        let ok = cache
            .try_get_or_set("k", None, || async { Ok::<u32, &str>(5) })
            .await;
        tokio_test::assert_ok!(ok);
        assert_eq!(cache.get(&"k"), Some(5));
    }
}
