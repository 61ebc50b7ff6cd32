//! Internal storage implementation for the cache.
//!
//! Entries live in an `IndexMap`. Each slot also carries the positions of
//! its neighbours in recency order, so the map doubles as a doubly linked
//! list: head is the least recently used entry, tail the most recently
//! used. Promotion, insertion and removal are all O(1).
//!
//! The store is not synchronized; `Cache` wraps it in a lock.

use indexmap::IndexMap;
use std::hash::Hash;
use std::mem;
use std::time::{Duration, Instant};

use crate::entry::CacheEntry;

/// Sentinel position meaning "no neighbour".
const NIL: usize = usize::MAX;

/// A stored entry plus its links in the recency list.
#[derive(Debug)]
struct Slot<V> {
    entry: CacheEntry<V>,
    prev: usize,
    next: usize,
}

/// Result of looking a key up with expiry applied.
#[derive(Debug)]
pub(crate) enum Lookup<'a, K, V> {
    /// The key is present and fresh; it is now the most recently used.
    Hit(&'a K, &'a V),
    /// The key was present but stale, and has been removed.
    Expired(K, V),
    /// The key is not present.
    Miss,
}

/// Result of writing a key.
#[derive(Debug)]
pub(crate) enum Insertion<K, V> {
    /// The key existed; its previous value is returned.
    Updated(V),
    /// The key was new; `evicted` is the LRU entry dropped to make room.
    Inserted { evicted: Option<(K, V)> },
}

/// Entry map fused with the recency index.
#[derive(Debug)]
pub(crate) struct Store<K, V> {
    slots: IndexMap<K, Slot<V>>,
    /// Least recently used position.
    head: usize,
    /// Most recently used position.
    tail: usize,
    max_size: usize,
    ttl: Duration,
}

impl<K, V> Store<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty store. `max_size` must be positive.
    pub(crate) fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            slots: IndexMap::with_capacity(max_size.min(1024)),
            head: NIL,
            tail: NIL,
            max_size,
            ttl,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check for a key without applying expiry or touching recency.
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + indexmap::Equivalent<K>,
    {
        self.slots.contains_key(key)
    }

    /// Look a key up as of `now`.
    ///
    /// A fresh entry is promoted to most recently used. A stale one is
    /// removed and handed back so the caller can report the eviction.
    pub(crate) fn get<Q>(&mut self, key: &Q, now: Instant) -> Lookup<'_, K, V>
    where
        Q: ?Sized + Hash + indexmap::Equivalent<K>,
    {
        let Some(idx) = self.slots.get_index_of(key) else {
            return Lookup::Miss;
        };

        if self.slots[idx].entry.is_expired_at(now, self.ttl) {
            let (key, value) = self.remove_index(idx);
            return Lookup::Expired(key, value);
        }

        self.move_to_tail(idx);
        match self.slots.get_index(idx) {
            Some((key, slot)) => Lookup::Hit(key, &slot.entry.value),
            None => Lookup::Miss,
        }
    }

    /// Write a key as of `now`.
    ///
    /// An existing key gets a fresh value and timestamp and becomes most
    /// recently used. A new key first evicts the LRU entry if the store is
    /// full.
    pub(crate) fn insert(&mut self, key: K, value: V, now: Instant) -> Insertion<K, V> {
        if let Some((idx, _, slot)) = self.slots.get_full_mut(&key) {
            let old = mem::replace(&mut slot.entry, CacheEntry::new_at(value, now));
            self.move_to_tail(idx);
            return Insertion::Updated(old.into_value());
        }

        let evicted = if self.slots.len() >= self.max_size {
            self.pop_lru()
        } else {
            None
        };

        let slot = Slot {
            entry: CacheEntry::new_at(value, now),
            prev: NIL,
            next: NIL,
        };
        let (idx, _) = self.slots.insert_full(key, slot);
        self.link_tail(idx);

        Insertion::Inserted { evicted }
    }

    /// Remove a key regardless of expiry.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized + Hash + indexmap::Equivalent<K>,
    {
        let idx = self.slots.get_index_of(key)?;
        Some(self.remove_index(idx))
    }

    /// Remove the least recently used entry.
    pub(crate) fn pop_lru(&mut self) -> Option<(K, V)> {
        if self.head == NIL {
            return None;
        }
        Some(self.remove_index(self.head))
    }

    /// Drop every entry and all recency state.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Keys from least to most recently used.
    pub(crate) fn keys_by_recency(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.slots.len());
        let mut cursor = self.head;
        while cursor != NIL {
            let Some((key, slot)) = self.slots.get_index(cursor) else {
                break;
            };
            keys.push(key);
            cursor = slot.next;
        }
        keys
    }

    // Private helper methods

    /// Unlink and remove the slot at `idx`.
    ///
    /// `swap_remove` moves the last slot into `idx`, so the moved slot's
    /// neighbours are re-pointed at its new position.
    fn remove_index(&mut self, idx: usize) -> (K, V) {
        self.unlink(idx);

        let last = self.slots.len() - 1;
        let (key, slot) = self
            .slots
            .swap_remove_index(idx)
            .unwrap_or_else(|| unreachable!("recency index points at a missing slot"));

        if idx != last {
            let (prev, next) = {
                let moved = &self.slots[idx];
                (moved.prev, moved.next)
            };
            if prev == NIL {
                self.head = idx;
            } else {
                self.slots[prev].next = idx;
            }
            if next == NIL {
                self.tail = idx;
            } else {
                self.slots[next].prev = idx;
            }
        }

        (key, slot.entry.into_value())
    }

    fn move_to_tail(&mut self, idx: usize) {
        if self.tail == idx {
            return;
        }
        self.unlink(idx);
        self.link_tail(idx);
    }

    /// Detach the slot at `idx` from its neighbours.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = &self.slots[idx];
            (slot.prev, slot.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }

        let slot = &mut self.slots[idx];
        slot.prev = NIL;
        slot.next = NIL;
    }

    /// Append a detached slot as most recently used.
    fn link_tail(&mut self, idx: usize) {
        let old_tail = self.tail;
        {
            let slot = &mut self.slots[idx];
            slot.prev = old_tail;
            slot.next = NIL;
        }
        if old_tail == NIL {
            self.head = idx;
        } else {
            self.slots[old_tail].next = idx;
        }
        self.tail = idx;
    }
}

#[cfg(test)]
impl<K, V> Store<K, V>
where
    K: Hash + Eq,
{
    /// Verify that the list visits every slot exactly once, in both
    /// directions, and that capacity holds.
    pub(crate) fn check_invariants(&self) {
        assert!(self.slots.len() <= self.max_size, "capacity exceeded");

        let mut seen = vec![false; self.slots.len()];
        let mut cursor = self.head;
        let mut prev = NIL;
        let mut count = 0;
        while cursor != NIL {
            assert!(cursor < self.slots.len(), "dangling link {}", cursor);
            assert!(!seen[cursor], "cycle at {}", cursor);
            seen[cursor] = true;
            assert_eq!(self.slots[cursor].prev, prev, "broken back link");
            prev = cursor;
            cursor = self.slots[cursor].next;
            count += 1;
        }
        assert_eq!(prev, self.tail, "tail mismatch");
        assert_eq!(count, self.slots.len(), "orphaned entries");
    }
}
