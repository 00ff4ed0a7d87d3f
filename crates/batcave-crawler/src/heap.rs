//! Generic min-priority queue.
//!
//! Elements expose an ordered priority key through [`Prioritized`]; the queue
//! always yields the element with the smallest key. Elements with equal keys
//! come out in insertion order, so an element pushed back with a key equal to
//! others waits behind them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An element that can be ordered in a [`MinQueue`].
pub trait Prioritized {
    type Key: Ord + Copy;

    /// The ordering key. Smaller keys are popped first.
    fn priority(&self) -> Self::Key;
}

struct Entry<T: Prioritized> {
    key: T::Key,
    seq: u64,
    item: T,
}

impl<T: Prioritized> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl<T: Prioritized> Eq for Entry<T> {}

impl<T: Prioritized> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Prioritized> Ord for Entry<T> {
    // `BinaryHeap` is a max-heap; reverse so the smallest (key, seq) is on top.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.key, other.seq).cmp(&(self.key, self.seq))
    }
}

/// A binary min-heap over any [`Prioritized`] element.
///
/// The key is captured when an element is pushed. The queue owns its
/// elements and hands out no mutable access, so the captured key cannot go
/// stale.
pub struct MinQueue<T: Prioritized> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T: Prioritized> MinQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Inserts `item`; O(log n).
    pub fn push(&mut self, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            key: item.priority(),
            seq,
            item,
        });
    }

    /// Removes and returns the element with the smallest key; O(log n).
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Elements in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|entry| &entry.item)
    }
}

impl<T: Prioritized> Default for MinQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Prioritized> FromIterator<T> for MinQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = MinQueue::new();
        for item in iter {
            queue.push(item);
        }
        queue
    }
}
