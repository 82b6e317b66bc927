//! Entry pool: fixed slab of cache entries
//!
//! Slots are handed out by bump allocation until the slab is full. After
//! that the only way to get a slot is to reclaim the LRU victim chosen by
//! the cache.

/// Handle to a slot in the [`Pool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(pub(crate) usize);

/// Key/value pair stored in a slot
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

/// Preallocated entry storage
pub(crate) struct Pool<K, V> {
    /// Live slots. `slots.len()` is the free-index counter: every slot below
    /// it has been handed out, every slot above it is untouched.
    slots: Vec<Entry<K, V>>,
    capacity: usize,
}

impl<K, V> Pool<K, V> {
    /// Reserve storage for exactly `capacity` entries
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Take the next never-used slot, or `None` once every slot has been
    /// handed out.
    pub(crate) fn acquire(&mut self, key: K, value: V) -> Option<SlotId> {
        if self.is_exhausted() {
            return None;
        }

        let id = SlotId(self.slots.len());
        // Within the reserved capacity, so this never reallocates.
        self.slots.push(Entry { key, value });
        Some(id)
    }

    /// Overwrite a live slot with a new key/value, returning the evicted entry
    pub(crate) fn reclaim(&mut self, id: SlotId, key: K, value: V) -> Entry<K, V> {
        std::mem::replace(&mut self.slots[id.0], Entry { key, value })
    }

    pub(crate) fn entry(&self, id: SlotId) -> &Entry<K, V> {
        &self.slots[id.0]
    }

    pub(crate) fn entry_mut(&mut self, id: SlotId) -> &mut Entry<K, V> {
        &mut self.slots[id.0]
    }

    /// Number of live slots
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.slots.len() == self.capacity
    }
}
