//! Bounded, deduplicating snapshot buffer.

use std::collections::VecDeque;

/// Ordered buffer of formatted snapshot entries with a fixed capacity.
///
/// Invariants:
/// - size never exceeds capacity; overflow evicts the oldest entry (FIFO)
/// - no two adjacent entries are textually identical (an entry equal to the
///   most recently appended one is discarded; non-adjacent repeats are kept)
/// - iteration order is insertion order
#[derive(Debug)]
pub struct RingLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl RingLog {
    /// Create a ring with the given capacity (>= 1, enforced by config
    /// validation upstream).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry unless it duplicates the most recent one, evicting
    /// the oldest entry when over capacity. Returns whether the entry was
    /// kept.
    pub fn push(&mut self, entry: String) -> bool {
        if self.entries.back() == Some(&entry) {
            return false;
        }
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    /// Remove and return all entries in insertion order.
    pub fn drain(&mut self) -> Vec<String> {
        self.entries.drain(..).collect()
    }

    /// Number of buffered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate buffered entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
