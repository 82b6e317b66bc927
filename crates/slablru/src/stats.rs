//! Traffic counters for an [`LruCache`](crate::LruCache)

use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Live counters, bumped by the cache as it serves calls
///
/// Each counter is independent and relaxed, so reading several of them while
/// other threads write can mix slightly different moments. Use
/// [`snapshot`](CacheStats::snapshot) to read them together.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    evictions: AtomicU64,
}

/// Plain copy of the counters at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// `get` calls that found their key
    pub hits: u64,
    /// `get` calls for absent keys
    pub misses: u64,
    /// `put` calls that added a key
    pub inserts: u64,
    /// `put` calls that replaced a value
    pub updates: u64,
    /// Entries pushed out to make room
    pub evictions: u64,
}

impl StatsSnapshot {
    /// Share of `get` calls that hit, in `0.0..=1.0`; `0.0` before any `get`
    pub fn hit_ratio(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }
}

impl CacheStats {
    /// All counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Relaxed);
    }

    /// Read every counter into a [`StatsSnapshot`]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Relaxed),
            misses: self.misses.load(Relaxed),
            inserts: self.inserts.load(Relaxed),
            updates: self.updates.load(Relaxed),
            evictions: self.evictions.load(Relaxed),
        }
    }

    /// `get` calls that found their key
    pub fn hits(&self) -> u64 {
        self.hits.load(Relaxed)
    }

    /// `get` calls for absent keys
    pub fn misses(&self) -> u64 {
        self.misses.load(Relaxed)
    }

    /// `put` calls that added a key
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Relaxed)
    }

    /// `put` calls that replaced a value
    pub fn updates(&self) -> u64 {
        self.updates.load(Relaxed)
    }

    /// Entries pushed out to make room
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Relaxed)
    }

    /// Share of `get` calls that hit; see [`StatsSnapshot::hit_ratio`]
    pub fn hit_ratio(&self) -> f64 {
        self.snapshot().hit_ratio()
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.inserts,
            &self.updates,
            &self.evictions,
        ] {
            counter.store(0, Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio_counts_only_lookups() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_ratio(), 0.0);

        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_insert();

        assert_eq!(stats.hit_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn test_snapshot_copies_every_counter() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        stats.record_insert();
        stats.record_update();
        stats.record_eviction();

        let snap = stats.snapshot();
        assert_eq!(
            snap,
            StatsSnapshot { hits: 1, misses: 2, inserts: 1, updates: 1, evictions: 1 }
        );

        stats.record_hit();
        assert_eq!(snap.hits, 1, "snapshot must not track later traffic");
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let stats = CacheStats::new();
        stats.record_insert();
        stats.record_update();
        stats.record_eviction();
        stats.record_miss();

        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }
}
