// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A bounded circular event queue that grows instead of dropping events.
//!
//! The backing array always keeps one slot free, so `head == tail` means
//! "empty" and `(head + 1) % capacity == tail` means "full". A `put` that
//! finds the queue full releases the lock, grows the array and retries.
//!
//! `head` and `tail` live outside the lock so that [`EventQueue::is_empty`]
//! and the empty fast path of [`EventQueue::get`] never touch it. They are
//! only written while the lock is held.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::types::Event;
use crate::config::{GrowthPolicy, QueueConfig, MIN_QUEUE_CAPACITY};
use crate::sync::atomic::fetch_max_u64;
use crate::sync::{AtomicWord, SpinLock};

/// A snapshot of queue activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items accepted by `put`.
    pub puts: u64,
    /// Items handed out by `get`.
    pub gets: u64,
    /// Times the backing array grew.
    pub resizes: u64,
    /// Largest number of items held at once.
    pub peak_len: u64,
    /// Current capacity of the backing array.
    pub capacity: usize,
}

impl QueueStats {
    /// Items currently queued according to the counters.
    pub fn pending(&self) -> u64 {
        self.puts.saturating_sub(self.gets)
    }
}

#[derive(Debug, Default)]
struct Counters {
    puts: AtomicU64,
    gets: AtomicU64,
    resizes: AtomicU64,
    peak_len: AtomicU64,
}

/// A multi-producer circular queue of owned items, `Event` by default.
///
/// Producers on any thread call [`put`](Self::put); the frame loop drains
/// with [`get`](Self::get). FIFO order holds for everything a single thread
/// puts, including across growth.
pub struct EventQueue<T = Event> {
    slots: SpinLock<Box<[Option<T>]>>,
    head: AtomicUsize,
    tail: AtomicUsize,
    capacity: AtomicUsize,
    growth: GrowthPolicy,
    counters: Counters,
}

impl<T> EventQueue<T> {
    /// Creates a queue with the default configuration.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Creates a queue with `capacity` slots that doubles on overflow.
    ///
    /// Capacities below [`MIN_QUEUE_CAPACITY`] are raised to it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(QueueConfig {
            initial_capacity: capacity,
            growth: GrowthPolicy::Double,
        })
    }

    /// Creates a queue from a [`QueueConfig`].
    pub fn with_config(config: QueueConfig) -> Self {
        let capacity = config.initial_capacity.max(MIN_QUEUE_CAPACITY);
        Self {
            slots: SpinLock::new(empty_slots(capacity)),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            capacity: AtomicUsize::new(capacity),
            growth: config.growth,
            counters: Counters::default(),
        }
    }

    /// Appends `item`, growing the backing array if it is full.
    ///
    /// Never drops an item. Growth allocates, and allocation failure
    /// aborts the process.
    pub fn put(&self, item: T) {
        loop {
            let mut slots = self.slots.lock();
            let capacity = slots.len();
            let head = self.head.load(Ordering::Relaxed);
            let tail = self.tail.load(Ordering::Relaxed);
            let new_head = (head + 1) % capacity;

            if new_head == tail {
                drop(slots);
                self.resize(self.growth.next_capacity(capacity));
                continue;
            }

            slots[head] = Some(item);
            self.head.store(new_head, Ordering::Release);
            drop(slots);

            let len = (new_head + capacity - tail) % capacity;
            self.counters.puts.increment(1);
            fetch_max_u64(&self.counters.peak_len, len as u64);
            return;
        }
    }

    /// Removes and returns the oldest item, or `None` if the queue is empty.
    ///
    /// An empty queue is detected without taking the lock, and `head` and
    /// `tail` are left untouched.
    pub fn get(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = {
            let mut slots = self.slots.lock();
            let tail = self.tail.load(Ordering::Relaxed);
            if tail == self.head.load(Ordering::Relaxed) {
                return None;
            }
            let item = slots[tail].take();
            self.tail.store((tail + 1) % slots.len(), Ordering::Release);
            item
        };

        debug_assert!(item.is_some(), "live queue slot was empty");
        self.counters.gets.increment(1);
        item
    }

    /// Drains and drops every queued item, returning how many there were.
    pub fn clear(&self) -> usize {
        let mut drained = 0;
        while let Some(item) = self.get() {
            drop(item);
            drained += 1;
        }
        if drained > 0 {
            log::debug!("EventQueue: cleared {drained} pending items");
        }
        drained
    }

    /// Returns an iterator that calls [`get`](Self::get) until the queue is
    /// empty. Items put while iterating are picked up as well.
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.get())
    }

    /// Returns `true` if the queue looked empty at the moment of the read.
    ///
    /// Lock-free and therefore advisory while producers are active.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Approximate number of queued items. Exact when no thread is
    /// mutating the queue.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        // The three loads can straddle a resize; wrap instead of overflowing.
        let capacity = self.capacity.load(Ordering::Acquire);
        head.wrapping_add(capacity).wrapping_sub(tail) % capacity
    }

    /// Current number of slots in the backing array.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Acquire)
    }

    /// Grows the backing array to `new_capacity` slots.
    ///
    /// Queued items keep their order and are moved to the front of the new
    /// array. Does nothing (and returns `false`) if the queue is already at
    /// least that large, which also covers a concurrent resize winning.
    pub fn resize(&self, new_capacity: usize) -> bool {
        if new_capacity <= self.capacity() {
            return false;
        }

        // Allocated before taking the lock so the critical section only moves items.
        let mut fresh = empty_slots(new_capacity);

        let retired = {
            let mut slots = self.slots.lock();
            let old_capacity = slots.len();
            if old_capacity >= new_capacity {
                return false;
            }

            let head = self.head.load(Ordering::Relaxed);
            let mut index = self.tail.load(Ordering::Relaxed);
            let mut len = 0;
            while index != head {
                fresh[len] = slots[index].take();
                len += 1;
                index = (index + 1) % old_capacity;
            }

            let retired = std::mem::replace(&mut *slots, fresh);
            self.tail.store(0, Ordering::Release);
            self.head.store(len, Ordering::Release);
            self.capacity.store(new_capacity, Ordering::Release);
            retired
        };
        drop(retired);

        self.counters.resizes.increment(1);
        log::debug!("EventQueue: grew to {new_capacity} slots");
        true
    }

    /// Returns a snapshot of the activity counters.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            puts: self.counters.puts.load(Ordering::Relaxed),
            gets: self.counters.gets.load(Ordering::Relaxed),
            resizes: self.counters.resizes.load(Ordering::Relaxed),
            peak_len: self.counters.peak_len.load(Ordering::Relaxed),
            capacity: self.capacity(),
        }
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("growth", &self.growth)
            .finish()
    }
}

fn empty_slots<T>(capacity: usize) -> Box<[Option<T>]> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn preserves_fifo_order() {
        let queue = EventQueue::with_capacity(16);
        for i in 0..10 {
            queue.put(i);
        }
        let drained: Vec<i32> = queue.drain().collect();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }

    #[test]
    fn get_on_empty_queue_is_idempotent() {
        let queue: EventQueue<u32> = EventQueue::with_capacity(4);
        for _ in 0..3 {
            assert_eq!(queue.get(), None);
        }
        assert_eq!(queue.head.load(Ordering::SeqCst), 0);
        assert_eq!(queue.tail.load(Ordering::SeqCst), 0);
        assert_eq!(queue.stats().gets, 0);
    }

    #[test]
    fn growth_is_transparent_to_ordering() {
        let queue = EventQueue::with_capacity(2);
        for i in 0..100 {
            queue.put(i);
        }
        assert!(queue.capacity() > 100);
        let drained: Vec<u32> = queue.drain().collect();
        assert_eq!(drained, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn growth_preserves_order_across_wraparound() {
        let queue = EventQueue::with_config(QueueConfig {
            initial_capacity: 4,
            growth: GrowthPolicy::Fixed(1),
        });

        // Move head/tail away from index 0 so the live range wraps.
        queue.put(0);
        queue.put(1);
        assert_eq!(queue.get(), Some(0));
        assert_eq!(queue.get(), Some(1));

        for i in 10..16 {
            queue.put(i);
        }
        assert_eq!(queue.len(), 6);
        assert_eq!(queue.drain().collect::<Vec<_>>(), (10..16).collect::<Vec<_>>());
        assert_eq!(queue.stats().resizes, 3);
    }

    #[test]
    fn capacity_below_minimum_is_raised() {
        let queue = EventQueue::with_capacity(1);
        assert_eq!(queue.capacity(), MIN_QUEUE_CAPACITY);
        queue.put("only");
        assert_eq!(queue.get(), Some("only"));
    }

    #[test]
    fn resize_never_shrinks() {
        let queue: EventQueue<u8> = EventQueue::with_capacity(8);
        assert!(!queue.resize(4));
        assert!(!queue.resize(8));
        assert!(queue.resize(9));
        assert_eq!(queue.capacity(), 9);
    }

    #[test]
    fn clear_drops_everything() {
        let tracker = Arc::new(());
        let queue = EventQueue::with_capacity(4);
        for _ in 0..5 {
            queue.put(Arc::clone(&tracker));
        }
        assert_eq!(Arc::strong_count(&tracker), 6);
        assert_eq!(queue.clear(), 5);
        assert_eq!(Arc::strong_count(&tracker), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn dropping_the_queue_drops_pending_items() {
        let tracker = Arc::new(());
        {
            let queue = EventQueue::with_capacity(4);
            queue.put(Arc::clone(&tracker));
            queue.put(Arc::clone(&tracker));
        }
        assert_eq!(Arc::strong_count(&tracker), 1);
    }

    #[test]
    fn stats_track_activity() {
        let queue = EventQueue::with_capacity(2);
        queue.put(1u8);
        queue.put(2u8);
        queue.put(3u8);
        queue.get();

        let stats = queue.stats();
        assert_eq!(stats.puts, 3);
        assert_eq!(stats.gets, 1);
        assert_eq!(stats.pending(), 2);
        assert_eq!(stats.peak_len, 3);
        assert!(stats.resizes >= 1);
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 2_000;

        let queue = Arc::new(EventQueue::with_capacity(2));
        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        queue.put((producer, seq));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Thread join failed");
        }

        let mut seen = HashSet::new();
        let mut last_seq = vec![None; PRODUCERS];
        for (producer, seq) in queue.drain() {
            assert!(seen.insert((producer, seq)), "duplicate item");
            // Each producer's items come out in program order.
            if let Some(previous) = last_seq[producer] {
                assert!(seq > previous);
            }
            last_seq[producer] = Some(seq);
        }
        assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER);
    }

    #[test]
    fn consumer_can_drain_while_producers_run() {
        let queue = Arc::new(EventQueue::with_capacity(4));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..5_000u32 {
                    queue.put(i);
                }
            })
        };

        let mut received = Vec::with_capacity(5_000);
        while received.len() < 5_000 {
            match queue.get() {
                Some(item) => received.push(item),
                None => std::hint::spin_loop(),
            }
        }
        producer.join().expect("Thread join failed");
        assert_eq!(received, (0..5_000).collect::<Vec<_>>());
    }
}
