//! Priority ordering for mediated requests.
//!
//! Highest priority first; equal priorities leave in enqueue order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tokio::time::Instant;

#[derive(Debug)]
struct QueueEntry<T> {
    priority: i32,
    sequence: u64,
    enqueued_at: Instant,
    item: T,
}

impl<T> PartialEq for QueueEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<T> Eq for QueueEntry<T> {}

impl<T> PartialOrd for QueueEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueueEntry<T> {
    // Max-heap: higher priority wins, then the lower sequence number.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Debug)]
pub(crate) struct RequestQueue<T> {
    heap: BinaryHeap<QueueEntry<T>>,
    next_sequence: u64,
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }
}

impl<T> RequestQueue<T> {
    pub fn push(&mut self, priority: i32, item: T) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueueEntry {
            priority,
            sequence,
            enqueued_at: Instant::now(),
            item,
        });
    }

    /// Next item to dispatch, with how long it waited.
    pub fn pop(&mut self) -> Option<(T, std::time::Duration)> {
        self.heap
            .pop()
            .map(|entry| (entry.item, entry.enqueued_at.elapsed()))
    }

    pub fn drain(&mut self) -> Vec<T> {
        self.heap.drain().map(|entry| entry.item).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
