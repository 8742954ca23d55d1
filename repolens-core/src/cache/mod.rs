//! Result cache for analyzed repositories
//!
//! Finished profiles are keyed by locator. The cache is passed to whoever
//! needs it rather than living in a global, and [`LruProfileCache`] bounds
//! its size by evicting the least recently used locator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::models::CacheEntry;

/// Storage for finished repository profiles
pub trait ProfileCache: Send + Sync {
    fn get(&self, locator: &str) -> Option<Arc<CacheEntry>>;

    /// Look up an entry without touching recency or hit/miss counters
    fn peek(&self, locator: &str) -> Option<Arc<CacheEntry>>;

    /// Store an entry, replacing any previous one for the locator
    fn put(&self, locator: &str, entry: Arc<CacheEntry>);

    /// Drop the entry for `locator`; returns whether one existed
    fn invalidate(&self, locator: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn statistics(&self) -> CacheStatistics;
}

/// Statistics about cache performance
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub total_entries: usize,
    pub capacity: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub evictions: usize,
    pub cache_hit_ratio: f64,
}

struct Slot {
    entry: Arc<CacheEntry>,
    last_accessed: u64,
    access_count: usize,
}

#[derive(Default)]
struct LruState {
    slots: HashMap<String, Slot>,
    clock: u64,
    hits: usize,
    misses: usize,
    evictions: usize,
}

impl LruState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_accessed)
            .map(|(key, _)| key.clone());
        if let Some(oldest_key) = oldest {
            if let Some(slot) = self.slots.remove(&oldest_key) {
                debug!(
                    "Evicted {} from result cache after {} accesses",
                    oldest_key, slot.access_count
                );
            }
            self.evictions += 1;
        }
    }
}

/// In-memory cache bounded to `capacity` entries with LRU eviction
pub struct LruProfileCache {
    state: Mutex<LruState>,
    capacity: usize,
}

impl LruProfileCache {
    /// A zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(LruState::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, LruState> {
        // Every mutation leaves the map consistent, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for LruProfileCache {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_CACHE_CAPACITY)
    }
}

impl ProfileCache for LruProfileCache {
    fn get(&self, locator: &str) -> Option<Arc<CacheEntry>> {
        let mut state = self.lock();
        let now = state.tick();
        let found = state.slots.get_mut(locator).map(|slot| {
            slot.last_accessed = now;
            slot.access_count += 1;
            Arc::clone(&slot.entry)
        });
        if found.is_some() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        found
    }

    fn peek(&self, locator: &str) -> Option<Arc<CacheEntry>> {
        self.lock()
            .slots
            .get(locator)
            .map(|slot| Arc::clone(&slot.entry))
    }

    fn put(&self, locator: &str, entry: Arc<CacheEntry>) {
        let mut state = self.lock();
        let now = state.tick();
        if !state.slots.contains_key(locator) && state.slots.len() >= self.capacity {
            state.evict_lru();
        }
        state.slots.insert(
            locator.to_string(),
            Slot {
                entry,
                last_accessed: now,
                access_count: 0,
            },
        );
    }

    fn invalidate(&self, locator: &str) -> bool {
        self.lock().slots.remove(locator).is_some()
    }

    fn len(&self) -> usize {
        self.lock().slots.len()
    }

    fn statistics(&self) -> CacheStatistics {
        let state = self.lock();
        let total_accesses = state.hits + state.misses;
        #[allow(clippy::cast_precision_loss)]
        let cache_hit_ratio = if total_accesses > 0 {
            state.hits as f64 / total_accesses as f64
        } else {
            0.0
        };
        CacheStatistics {
            total_entries: state.slots.len(),
            capacity: self.capacity,
            cache_hits: state.hits,
            cache_misses: state.misses,
            evictions: state.evictions,
            cache_hit_ratio,
        }
    }
}
