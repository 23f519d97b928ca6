use std::collections::BTreeMap;

use catalog::FilterState;
use tracing::debug;

use crate::protocol::max_level_for_zoom;

pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// Exact-match key for one cluster query.
///
/// Combines the four viewport edges (bitwise, after folding `-0.0`) with
/// every other filter field, so one cache can serve all filters without
/// invalidation when the filter changes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryKey {
    viewport: [u64; 4],
    tags: Vec<String>,
    year: Option<i32>,
    max_level: u32,
    zoom_bits: Option<u64>,
}

impl QueryKey {
    pub fn new(filter: &FilterState) -> Self {
        Self {
            viewport: filter.viewport.key(),
            tags: filter.tags(),
            year: filter.year,
            max_level: max_level_for_zoom(filter.zoom),
            zoom_bits: filter
                .zoom
                .filter(|z| z.is_finite())
                .map(|z| foundation::math::canonical_f64(z).to_bits()),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Zero disables caching.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    last_used_tick: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Session-scoped query memo with a bounded LRU.
///
/// Notes on determinism:
/// - Entries are keyed in a `BTreeMap` for stable traversal order.
/// - Eviction is LRU by `last_used_tick`, with a tie-break by key ordering.
#[derive(Debug)]
pub struct EventQueryCache<V> {
    config: CacheConfig,
    tick: u64,
    entries: BTreeMap<QueryKey, CacheEntry<V>>,
    stats: CacheStats,
}

impl<V: Clone> Default for EventQueryCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<V: Clone> EventQueryCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            tick: 0,
            entries: BTreeMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Look up `key`, refreshing its recency on a hit. `None` is a miss.
    pub fn get(&mut self, key: &QueryKey) -> Option<V> {
        self.tick += 1;
        let entries = self.entries.len();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used_tick = self.tick;
                self.stats.hits += 1;
                debug!(entries, "query cache hit");
                Some(entry.value.clone())
            }
            None => {
                self.stats.misses += 1;
                debug!(entries, "query cache miss");
                None
            }
        }
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace. Returns the keys evicted to stay within the cap.
    pub fn put(&mut self, key: QueryKey, value: V) -> Vec<QueryKey> {
        if self.config.max_entries == 0 {
            return Vec::new();
        }
        self.tick += 1;
        self.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                last_used_tick: self.tick,
            },
        );
        self.evict_as_needed(&key)
    }

    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_as_needed(&mut self, protected: &QueryKey) -> Vec<QueryKey> {
        let mut evicted = Vec::new();
        while self.entries.len() > self.config.max_entries {
            let candidate = self
                .entries
                .iter()
                .filter(|(k, _)| *k != protected)
                .min_by(|(ka, ea), (kb, eb)| {
                    ea.last_used_tick
                        .cmp(&eb.last_used_tick)
                        .then_with(|| ka.cmp(kb))
                })
                .map(|(k, _)| k.clone());
            let Some(key) = candidate else {
                break;
            };
            self.entries.remove(&key);
            self.stats.evictions += 1;
            evicted.push(key);
        }
        if !evicted.is_empty() {
            debug!(evicted = evicted.len(), "query cache evicted entries");
        }
        evicted
    }
}
