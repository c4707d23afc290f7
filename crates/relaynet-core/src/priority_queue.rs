//! Min-priority queue with lazy invalidation.
//!
//! Entries are never removed from the heap when superseded. Instead the
//! slot backing an entry is tagged stale and skipped when it surfaces.
//! Equal priorities pop in insertion order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct HeapEntry {
    priority: FloatOrd,
    seq: usize,
}

#[derive(Debug)]
enum Slot<T> {
    Valid(T),
    Stale,
}

/// Handle to a queued entry, used to invalidate it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(usize);

#[derive(Debug)]
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Reverse<HeapEntry>>,
    slots: Vec<Slot<T>>,
    live: usize,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            slots: Vec::new(),
            live: 0,
        }
    }

    pub fn push(&mut self, item: T, priority: f64) -> EntryHandle {
        let seq = self.slots.len();
        self.slots.push(Slot::Valid(item));
        self.heap.push(Reverse(HeapEntry {
            priority: FloatOrd(priority),
            seq,
        }));
        self.live += 1;
        EntryHandle(seq)
    }

    /// Mark an entry stale. Returns its item if it was still live.
    pub fn invalidate(&mut self, handle: EntryHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.0)?;
        match std::mem::replace(slot, Slot::Stale) {
            Slot::Valid(item) => {
                self.live -= 1;
                Some(item)
            }
            Slot::Stale => None,
        }
    }

    /// Pop the lowest-priority live entry, skipping stale ones.
    pub fn pop(&mut self) -> Option<(T, f64)> {
        while let Some(Reverse(entry)) = self.heap.pop() {
            let slot = std::mem::replace(&mut self.slots[entry.seq], Slot::Stale);
            if let Slot::Valid(item) = slot {
                self.live -= 1;
                return Some((item, entry.priority.0));
            }
        }
        None
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Physical heap size including stale entries not yet popped.
    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }
}
