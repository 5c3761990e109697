//! Cache Entry Module
//!
//! Defines a single cached result together with the timer that will evict it.

use crate::cache::TimerHandle;

// == Cache Entry ==
/// A cached value plus its one live eviction timer.
///
/// The `generation` identifies which scheduled eviction currently owns the
/// entry. An eviction carrying any other generation is stale.
#[derive(Debug)]
pub struct Entry<V> {
    key: String,
    value: V,
    generation: u64,
    expiry: TimerHandle,
    served_from_cache: bool,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an entry owning a freshly scheduled eviction.
    ///
    /// # Arguments
    /// * `key` - The cache key the entry is stored under
    /// * `value` - The computed result
    /// * `generation` - Generation captured by the eviction timer
    /// * `expiry` - Handle of that eviction timer
    pub fn new(key: String, value: V, generation: u64, expiry: TimerHandle) -> Self {
        Self {
            key,
            value,
            generation,
            expiry,
            served_from_cache: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &V {
        &self.value
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once the entry has satisfied at least one lookup.
    pub fn served_from_cache(&self) -> bool {
        self.served_from_cache
    }

    // == Mark Served ==
    /// Records a hit. Returns true if this was the first one.
    pub fn mark_served(&mut self) -> bool {
        !std::mem::replace(&mut self.served_from_cache, true)
    }

    // == Replace Expiry ==
    /// Installs a new eviction timer, cancelling the one it replaces.
    pub fn replace_expiry(&mut self, generation: u64, expiry: TimerHandle) {
        let previous = std::mem::replace(&mut self.expiry, expiry);
        self.generation = generation;
        previous.cancel();
    }

    // == Into Expiry ==
    /// Consumes the entry, handing back its timer so the caller can cancel it.
    pub fn into_expiry(self) -> TimerHandle {
        self.expiry
    }
}
