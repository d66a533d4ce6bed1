//! Time-bounded cache of version lookups, owned by one provider

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::version::types::VersionOption;

/// Source of the current time in milliseconds since UNIX epoch
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(now_ms),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct CachedVersions {
    written_at: i64,
    versions: Vec<VersionOption>,
}

type Slot = Arc<OnceCell<CachedVersions>>;

/// Maps a component id to its ranked versions. Entries expire `ttl_ms` after
/// they were written; concurrent misses on one key share a single load.
pub struct VersionCache {
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Slot>>,
}

impl VersionCache {
    pub fn new(ttl_ms: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_ms,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // slots are inserted and removed whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn slot(&self, key: &str) -> Slot {
        let now = self.clock.now_ms();
        let mut entries = self.lock_entries();

        if let Some(slot) = entries.get(key) {
            match slot.get() {
                Some(cached) if now - cached.written_at >= self.ttl_ms => {
                    debug!("Cached versions for {} expired", key);
                }
                _ => return Arc::clone(slot),
            }
        }

        let slot: Slot = Arc::new(OnceCell::new());
        entries.insert(key.to_string(), Arc::clone(&slot));
        slot
    }

    /// Returns cached versions for `key`, running `load` on a miss or after expiry.
    /// Whatever `load` returns is cached, including an empty list.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Vec<VersionOption>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<VersionOption>>,
    {
        let slot = self.slot(key);
        let cached = slot
            .get_or_init(|| async {
                let versions = load().await;
                debug!("Caching {} versions for {}", versions.len(), key);
                CachedVersions {
                    written_at: self.clock.now_ms(),
                    versions,
                }
            })
            .await;
        cached.versions.clone()
    }

    /// Cached versions for `key` if present and fresh; never triggers a load
    pub fn peek(&self, key: &str) -> Option<Vec<VersionOption>> {
        let now = self.clock.now_ms();
        let entries = self.lock_entries();
        let cached = entries.get(key)?.get()?;
        (now - cached.written_at < self.ttl_ms).then(|| cached.versions.clone())
    }

    pub fn invalidate(&self, key: &str) {
        self.lock_entries().remove(key);
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const TTL: i64 = 10 * 60 * 1000;

    fn cache_with_clock() -> (VersionCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        (VersionCache::new(TTL, clock.clone()), clock)
    }

    async fn load_counting(
        cache: &VersionCache,
        key: &str,
        calls: &AtomicUsize,
        versions: &[&str],
    ) -> Vec<VersionOption> {
        cache
            .get_or_load(key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                versions.iter().map(|v| VersionOption::plain(v)).collect()
            })
            .await
    }

    #[tokio::test]
    async fn second_lookup_within_ttl_is_served_from_cache() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        let first = load_counting(&cache, "com.foo:bar", &calls, &["1.0.0"]).await;
        clock.advance(TTL - 1);
        let second = load_counting(&cache, "com.foo:bar", &calls, &["2.0.0"]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_results_are_cached() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        assert!(load_counting(&cache, "com.foo:bar", &calls, &[]).await.is_empty());
        assert!(load_counting(&cache, "com.foo:bar", &calls, &[]).await.is_empty());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn entry_reloads_after_ttl() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        load_counting(&cache, "com.foo:bar", &calls, &["1.0.0"]).await;
        clock.advance(TTL);
        let reloaded = load_counting(&cache, "com.foo:bar", &calls, &["2.0.0"]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(reloaded, vec![VersionOption::plain("2.0.0")]);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        load_counting(&cache, "com.foo:bar", &calls, &["1.0.0"]).await;
        let other = load_counting(&cache, "com.foo:baz", &calls, &["3.0.0"]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(other, vec![VersionOption::plain("3.0.0")]);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_load() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            load_counting(&cache, "com.foo:bar", &calls, &["1.0.0"]),
            load_counting(&cache, "com.foo:bar", &calls, &["1.0.0"]),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn peek_respects_ttl_without_loading() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.peek("com.foo:bar"), None);
        load_counting(&cache, "com.foo:bar", &calls, &["1.0.0"]).await;
        assert_eq!(cache.peek("com.foo:bar"), Some(vec![VersionOption::plain("1.0.0")]));
        clock.advance(TTL);
        assert_eq!(cache.peek("com.foo:bar"), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        load_counting(&cache, "com.foo:bar", &calls, &["1.0.0"]).await;
        cache.invalidate("com.foo:bar");
        load_counting(&cache, "com.foo:bar", &calls, &["1.0.0"]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
