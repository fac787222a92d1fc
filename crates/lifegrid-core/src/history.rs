//! Rolling window of population counts for the trend chart.

use std::collections::VecDeque;

/// Default number of generations retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded FIFO of population counts, oldest first.
///
/// Zero is a valid entry (an extinct generation), not an absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTracker {
    values: VecDeque<u32>,
    capacity: usize,
}

impl Default for HistoryTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryTracker {
    /// Create an empty tracker holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Append a count, evicting from the front past capacity.
    pub fn push(&mut self, count: u32) {
        self.values.push_back(count);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// The retained counts, oldest first.
    pub const fn values(&self) -> &VecDeque<u32> {
        &self.values
    }

    /// The most recent count.
    pub fn latest(&self) -> Option<u32> {
        self.values.back().copied()
    }

    /// Largest retained count.
    pub fn peak(&self) -> Option<u32> {
        self.values.iter().copied().max()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been pushed since the last clear.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maximum number of retained entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
