//! LruCache: fixed-capacity, thread-safe LRU cache

use std::borrow::Borrow;
use std::hash::Hash;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::index::KeyIndex;
use crate::list::RecencyList;
use crate::pool::{Entry, Pool};
use crate::stats::CacheStats;

/// Bounded key/value store that evicts the least recently used entry when full
///
/// Both [`put`](LruCache::put) and [`get`](LruCache::get) move the touched key
/// to the most recently used position, so every call takes the same
/// exclusive lock. Entries live in a slab sized at construction; once it is
/// full, new keys reuse the slot of the entry they evict.
pub struct LruCache<K, V> {
    /// Pool, list and index, guarded together
    inner: Mutex<Inner<K, V>>,

    /// Cache statistics
    stats: CacheStats,

    /// Cache capacity
    capacity: usize,
}

struct Inner<K, V> {
    pool: Pool<K, V>,
    list: RecencyList,
    index: KeyIndex<K>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq,
{
    /// Create a new cache holding at most `capacity` entries
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries; any integer type
    ///
    /// # Returns
    /// * `Result<LruCache>` - `Error::InvalidCapacity` if `capacity` is zero,
    ///   negative, or too large for `usize`
    pub fn new<C>(capacity: C) -> Result<Self>
    where
        C: TryInto<usize>,
    {
        let capacity = match capacity.try_into() {
            Ok(capacity) if capacity > 0 => capacity,
            _ => return Err(Error::InvalidCapacity),
        };
        debug!(capacity, "creating LRU cache");

        Ok(Self {
            inner: Mutex::new(Inner {
                pool: Pool::new(capacity),
                list: RecencyList::new(capacity),
                index: KeyIndex::with_capacity(capacity),
            }),
            stats: CacheStats::new(),
            capacity,
        })
    }

    /// Insert or update a key, making it the most recently used
    ///
    /// An existing key has its value replaced in place. A new key takes a
    /// fresh slot while any remain, otherwise it evicts the least recently
    /// used entry and reuses its slot.
    pub fn put(&self, key: K, value: V)
    where
        K: Clone,
    {
        let mut replaced = None;
        let evicted = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;

            if let Some(slot) = inner.index.lookup(&key) {
                let old = std::mem::replace(&mut inner.pool.entry_mut(slot).value, value);
                replaced = Some(old);
                inner.list.promote(slot);
                self.stats.record_update();
                None
            } else {
                self.stats.record_insert();
                inner.insert(key, value)
            }
        };

        if evicted.is_some() {
            self.stats.record_eviction();
        }
        // Old values are dropped outside the lock.
        drop((replaced, evicted));
    }

    /// Get a copy of the value for `key`, making it the most recently used
    ///
    /// Returns `None` if the key is absent; a miss leaves the cache untouched.
    /// Store values that are expensive to copy, or not `Clone`, behind an
    /// `Arc`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.index.lookup(key) {
            Some(slot) => {
                inner.list.promote(slot);
                self.stats.record_hit();
                Some(inner.pool.entry(slot).value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Get a copy of the value for `key` without changing its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let inner = self.inner.lock();
        inner
            .index
            .lookup(key)
            .map(|slot| inner.pool.entry(slot).value.clone())
    }

    /// Check whether `key` is cached, without changing its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().index.lookup(key).is_some()
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let inner = self.inner.lock();
        inner
            .list
            .iter()
            .map(|slot| inner.pool.entry(slot).key.clone())
            .collect()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().pool.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Assert every structural invariant of the pool, list and index
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        use std::collections::HashSet;

        let inner = self.inner.lock();
        let linked = inner.list.check_links();

        assert!(inner.pool.len() <= self.capacity);
        assert_eq!(linked, inner.pool.len(), "list length != live slots");
        assert_eq!(inner.index.len(), inner.pool.len(), "index size != live slots");

        let mut seen = HashSet::new();
        for slot in inner.list.iter() {
            assert!(slot.0 < inner.pool.len(), "free slot {} is linked", slot.0);
            assert!(seen.insert(slot), "slot {} linked twice", slot.0);
            let key = &inner.pool.entry(slot).key;
            assert_eq!(inner.index.lookup(key), Some(slot), "index disagrees for slot {}", slot.0);
        }
    }
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Place a key that is not in the index at the front of the list.
    /// Returns the entry evicted to make room, if any.
    fn insert(&mut self, key: K, value: V) -> Option<Entry<K, V>> {
        if self.pool.is_exhausted() {
            let Some(victim) = self.list.back() else {
                unreachable!("full pool with an empty recency list");
            };

            self.list.detach(victim);
            self.index.remove(&self.pool.entry(victim).key);
            let evicted = self.pool.reclaim(victim, key.clone(), value);
            self.list.attach_front(victim);
            self.index.insert(key, victim);
            trace!(slot = victim.0, "evicted LRU entry");

            return Some(evicted);
        }

        let Some(slot) = self.pool.acquire(key.clone(), value) else {
            unreachable!("pool has room but refused a slot");
        };
        self.list.attach_front(slot);
        self.index.insert(key, slot);
        debug_assert_eq!(self.list.front(), Some(slot));

        None
    }
}
