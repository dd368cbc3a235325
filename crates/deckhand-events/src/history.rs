//! Bounded history of recent records.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::record::EventRecord;

/// Fixed-capacity FIFO of recent records, oldest evicted first.
///
/// Only the publisher appends; everything else reads through snapshots.
#[derive(Debug)]
pub(crate) struct HistoryBuffer {
    records: VecDeque<Arc<EventRecord>>,
    capacity: usize,
}

impl HistoryBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest one if the buffer is full.
    pub(crate) fn append(&mut self, record: Arc<EventRecord>) {
        if self.capacity == 0 {
            return;
        }

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// The most recent `min(k, len)` records in insertion order.
    pub(crate) fn snapshot(&self, k: usize) -> Vec<Arc<EventRecord>> {
        let skip = self.records.len().saturating_sub(k);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }
}
