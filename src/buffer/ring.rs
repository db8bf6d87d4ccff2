//! Fixed-capacity ring buffer backing the line store.
//!
//! Logical index 0 is always the oldest line. Eviction moves `head` forward
//! instead of shifting every slot, so a full buffer appends in O(1).

use super::line::Line;

/// Upper bound on slots allocated up front; larger buffers grow on demand
const PREALLOC_LIMIT: usize = 1024;

#[derive(Debug)]
pub(crate) struct LineRing {
    /// Physical storage; grows until it holds `capacity` slots
    slots: Vec<Line>,
    /// Physical index of the oldest line
    head: usize,
    len: usize,
    capacity: usize,
}

impl LineRing {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.min(PREALLOC_LIMIT)),
            head: 0,
            len: 0,
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a line, returning the evicted oldest line when the ring was full
    pub(crate) fn push(&mut self, line: Line) -> Option<Line> {
        if self.slots.len() < self.capacity {
            // Still filling: head stays at 0 and slots mirror logical order
            self.slots.push(line);
            self.len += 1;
            None
        } else {
            let evicted = std::mem::replace(&mut self.slots[self.head], line);
            self.head = (self.head + 1) % self.capacity;
            Some(evicted)
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Line> {
        if index >= self.len {
            return None;
        }
        self.slots.get((self.head + index) % self.capacity)
    }

    /// Drop every line while keeping the allocated slots
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
        self.len = 0;
    }
}
