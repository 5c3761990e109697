//! Expiring Cache Module
//!
//! Read-through cache with sliding expiration. Every entry owns exactly one
//! eviction timer; a hit pushes that timer out by a full TTL.
//!
//! Timers are tagged with a generation number. Renewing an entry installs a
//! timer with a fresh generation, so an older timer that fires late finds a
//! mismatch and leaves the entry alone.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use tracing::debug;

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheStats, Entry, Scheduler, TimerHandle, TokioScheduler};

// == Lookup ==
/// Result of [`ExpiringCache::get_or_compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<V> {
    pub value: V,
    /// True when the value came from an existing entry.
    pub hit: bool,
}

// == Expiring Cache ==
/// Concurrent key to value cache whose entries expire after an idle TTL.
///
/// Cloning is cheap and every clone shares the same entries.
///
/// Two concurrent misses on the same key may both run their computation;
/// the later insert wins and the earlier entry's timer is cancelled.
pub struct ExpiringCache<V> {
    inner: Arc<Shared<V>>,
}

struct Shared<V> {
    entries: DashMap<String, Entry<V>>,
    scheduler: Arc<dyn Scheduler>,
    ttl: Duration,
    next_generation: AtomicU64,
    stats: StatsRecorder,
}

impl<V> Clone for ExpiringCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates an empty cache whose entries expire `ttl` after last access.
    pub fn new(ttl: Duration, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            inner: Arc::new(Shared {
                entries: DashMap::new(),
                scheduler,
                ttl,
                next_generation: AtomicU64::new(0),
                stats: StatsRecorder::default(),
            }),
        }
    }

    /// Creates a cache driven by the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn with_tokio(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(TokioScheduler::current()))
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, computing and storing it on a miss.
    ///
    /// On a hit the TTL renewal is handed to the scheduler and happens after
    /// this call returns. On a miss `compute` runs with no lock held; its
    /// error is returned as is and nothing is cached.
    pub fn get_or_compute<F, E>(&self, key: &str, compute: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        debug_assert!(!key.is_empty(), "cache keys must not be empty");

        if let Some(value) = self.serve_hit(key) {
            self.inner.stats.record_hit();
            self.defer_renewal(key);
            return Ok(Lookup { value, hit: true });
        }

        self.inner.stats.record_miss();
        let value = match compute() {
            Ok(value) => value,
            Err(err) => {
                self.inner.stats.record_failure();
                debug!("Computation for '{}' failed, not caching", key);
                return Err(err);
            }
        };

        self.insert(key, value.clone());
        Ok(Lookup { value, hit: false })
    }

    fn serve_hit(&self, key: &str) -> Option<V> {
        let mut entry = self.inner.entries.get_mut(key)?;
        if entry.mark_served() {
            debug!("First cache hit for '{}'", key);
        }
        Some(entry.payload().clone())
    }

    fn defer_renewal(&self, key: &str) {
        let cache = self.clone();
        let key = key.to_owned();
        self.inner.scheduler.defer(Box::new(move || {
            cache.renew(&key);
        }));
    }

    // The slot stays locked while the timer is scheduled, so the timer can
    // never observe the map before its entry is in it.
    fn insert(&self, key: &str, value: V) {
        match self.inner.entries.entry(key.to_owned()) {
            MapEntry::Occupied(mut occupied) => {
                let (generation, expiry) = self.schedule_eviction(key);
                let entry = Entry::new(key.to_owned(), value, generation, expiry);
                let previous = occupied.insert(entry);
                previous.into_expiry().cancel();
                debug!("Replaced cache entry '{}' (generation {})", key, generation);
            }
            MapEntry::Vacant(vacant) => {
                let (generation, expiry) = self.schedule_eviction(key);
                vacant.insert(Entry::new(key.to_owned(), value, generation, expiry));
                debug!("Cached '{}' (generation {})", key, generation);
            }
        }
    }

    fn schedule_eviction(&self, key: &str) -> (u64, TimerHandle) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let cache = Arc::downgrade(&self.inner);
        let key = key.to_owned();
        let expiry = self.inner.scheduler.schedule_after(
            self.inner.ttl,
            Box::new(move || {
                if let Some(inner) = cache.upgrade() {
                    ExpiringCache { inner }.evict(&key, generation);
                }
            }),
        );
        (generation, expiry)
    }

    // == Renew ==
    /// Restarts the TTL of `key` from now.
    ///
    /// Returns false if the key is not cached, which happens when an eviction
    /// won the race against this renewal.
    pub fn renew(&self, key: &str) -> bool {
        let Some(mut entry) = self.inner.entries.get_mut(key) else {
            debug!("Renewal of '{}' skipped, entry already gone", key);
            return false;
        };
        let (generation, expiry) = self.schedule_eviction(key);
        entry.replace_expiry(generation, expiry);
        self.inner.stats.record_renewal();
        true
    }

    // == Evict ==
    /// Removes `key` if its live timer still carries `generation`.
    ///
    /// Called by eviction timers. A mismatch means the entry was renewed or
    /// replaced after this timer was armed, and the call does nothing.
    pub fn evict(&self, key: &str, generation: u64) -> bool {
        let removed = self
            .inner
            .entries
            .remove_if(key, |_, entry| entry.generation() == generation);
        match removed {
            Some(_) => {
                self.inner.stats.record_eviction();
                debug!("Evicted '{}' (generation {})", key, generation);
                true
            }
            None => {
                debug!("Stale eviction for '{}' (generation {}) ignored", key, generation);
                false
            }
        }
    }

    // == Get ==
    /// Returns a copy of the cached value without touching its TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.entries.get(key).map(|entry| entry.payload().clone())
    }

    // == Delete ==
    /// Removes `key` and cancels its timer. Returns false if it was absent.
    pub fn delete(&self, key: &str) -> bool {
        match self.inner.entries.remove(key) {
            Some((_, entry)) => {
                entry.into_expiry().cancel();
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Removes every entry and cancels every timer. Returns how many went.
    pub fn clear(&self) -> usize {
        let keys: Vec<String> = self
            .inner
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        keys.iter().filter(|key| self.delete(key)).count()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.len())
    }
}

impl<V> Drop for Shared<V> {
    fn drop(&mut self) {
        for (_, entry) in std::mem::take(&mut self.entries) {
            entry.into_expiry().cancel();
        }
    }
}

impl<V> fmt::Debug for ExpiringCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("ttl", &self.inner.ttl)
            .field("entries", &self.inner.entries.len())
            .finish()
    }
}
