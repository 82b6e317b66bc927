//! Recency list: doubly linked list over an index arena
//!
//! Nodes `0..capacity` mirror pool slots; the two nodes after them are the
//! head and tail sentinels. Links are arena indices, so detach/attach are
//! plain index rewrites.

use crate::pool::SlotId;

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: usize,
    next: usize,
}

/// MRU-to-LRU ordering of live slots, bounded by head/tail sentinels
pub(crate) struct RecencyList {
    links: Box<[Link]>,
    head: usize,
    tail: usize,
}

impl RecencyList {
    /// Create an empty list able to hold `capacity` slots
    pub(crate) fn new(capacity: usize) -> Self {
        let head = capacity;
        let tail = capacity + 1;
        // Unlinked slots point at themselves.
        let mut links: Box<[Link]> = (0..capacity + 2)
            .map(|idx| Link { prev: idx, next: idx })
            .collect();
        links[head].next = tail;
        links[tail].prev = head;

        Self { links, head, tail }
    }

    /// Unlink a slot, joining its neighbors
    pub(crate) fn detach(&mut self, slot: SlotId) {
        let Link { prev, next } = self.links[slot.0];
        debug_assert!(prev != slot.0 && next != slot.0, "detach of unlinked slot");

        self.links[prev].next = next;
        self.links[next].prev = prev;
        self.links[slot.0] = Link {
            prev: slot.0,
            next: slot.0,
        };
    }

    /// Link a slot right after the head sentinel, making it the MRU
    pub(crate) fn attach_front(&mut self, slot: SlotId) {
        let first = self.links[self.head].next;

        self.links[slot.0] = Link {
            prev: self.head,
            next: first,
        };
        self.links[first].prev = slot.0;
        self.links[self.head].next = slot.0;
    }

    /// Move a linked slot to the front
    pub(crate) fn promote(&mut self, slot: SlotId) {
        if self.links[self.head].next == slot.0 {
            return; // Already MRU
        }
        self.detach(slot);
        self.attach_front(slot);
    }

    /// Most recently used slot
    pub(crate) fn front(&self) -> Option<SlotId> {
        let first = self.links[self.head].next;
        (first != self.tail).then_some(SlotId(first))
    }

    /// Least recently used slot, the next eviction victim
    pub(crate) fn back(&self) -> Option<SlotId> {
        let last = self.links[self.tail].prev;
        (last != self.head).then_some(SlotId(last))
    }

    /// Walk slots from MRU to LRU
    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.links[self.head].next,
        }
    }

    /// Check that every adjacent pair is mutually linked. Returns the number
    /// of nodes between the sentinels.
    #[cfg(test)]
    pub(crate) fn check_links(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.head;

        while cursor != self.tail {
            let next = self.links[cursor].next;
            assert_eq!(self.links[next].prev, cursor, "broken back-link at {}", next);
            assert!(count <= self.links.len(), "cycle in recency list");
            if next != self.tail {
                count += 1;
            }
            cursor = next;
        }

        count
    }
}

/// Iterator over slots in recency order
pub(crate) struct Iter<'a> {
    list: &'a RecencyList,
    cursor: usize,
}

impl Iterator for Iter<'_> {
    type Item = SlotId;

    fn next(&mut self) -> Option<SlotId> {
        if self.cursor == self.list.tail {
            return None;
        }
        let slot = SlotId(self.cursor);
        self.cursor = self.list.links[self.cursor].next;
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &RecencyList) -> Vec<usize> {
        list.iter().map(|slot| slot.0).collect()
    }

    #[test]
    fn test_list_empty() {
        let list = RecencyList::new(4);

        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.check_links(), 0);
    }

    #[test]
    fn test_list_attach_front() {
        let mut list = RecencyList::new(3);

        list.attach_front(SlotId(0));
        list.attach_front(SlotId(1));
        list.attach_front(SlotId(2));

        assert_eq!(order(&list), vec![2, 1, 0]);
        assert_eq!(list.front(), Some(SlotId(2)));
        assert_eq!(list.back(), Some(SlotId(0)));
        assert_eq!(list.check_links(), 3);
    }

    #[test]
    fn test_list_detach_middle_and_ends() {
        let mut list = RecencyList::new(4);
        for i in 0..4 {
            list.attach_front(SlotId(i));
        }

        list.detach(SlotId(2)); // middle
        assert_eq!(order(&list), vec![3, 1, 0]);

        list.detach(SlotId(3)); // next to head
        assert_eq!(order(&list), vec![1, 0]);

        list.detach(SlotId(0)); // next to tail
        assert_eq!(order(&list), vec![1]);
        assert_eq!(list.back(), Some(SlotId(1)));

        list.detach(SlotId(1));
        assert_eq!(list.front(), None);
        assert_eq!(list.check_links(), 0);
    }

    #[test]
    fn test_list_promote() {
        let mut list = RecencyList::new(3);
        for i in 0..3 {
            list.attach_front(SlotId(i));
        }

        list.promote(SlotId(0));
        assert_eq!(order(&list), vec![0, 2, 1]);

        list.promote(SlotId(0)); // already MRU
        assert_eq!(order(&list), vec![0, 2, 1]);

        list.promote(SlotId(2));
        assert_eq!(order(&list), vec![2, 0, 1]);
        assert_eq!(list.check_links(), 3);
    }
}
