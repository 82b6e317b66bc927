//! Key index: key -> slot lookup

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

use crate::pool::SlotId;

/// Hash index from key to pool slot
pub(crate) struct KeyIndex<K> {
    map: HashMap<K, SlotId, RandomState>,
}

impl<K: Hash + Eq> KeyIndex<K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    pub(crate) fn lookup<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).copied()
    }

    pub(crate) fn insert(&mut self, key: K, slot: SlotId) {
        let previous = self.map.insert(key, slot);
        debug_assert!(previous.is_none(), "key indexed twice");
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(key)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}
