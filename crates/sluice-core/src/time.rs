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

//! The event clock.
//!
//! Every event carries a timestamp in microseconds since the clock was
//! created. Timestamps handed out by one [`Clock`] strictly increase, even
//! when several producer threads stamp events within the same microsecond.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::sync::AtomicWord;

/// A strictly monotonic timestamp source shared by all producers.
#[derive(Debug)]
pub struct Clock {
    epoch: Instant,
    last: AtomicU64,
}

impl Clock {
    /// Creates a clock whose epoch is the current instant.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last: AtomicU64::new(0),
        }
    }

    /// Returns a fresh timestamp, strictly greater than every timestamp
    /// previously returned by this clock.
    pub fn now(&self) -> u64 {
        let elapsed = self.elapsed_micros();
        let mut observed = self.last.load(Ordering::Acquire);
        loop {
            let candidate = elapsed.max(observed.wrapping_add(1));
            let previous = self.last.compare_and_set(candidate, observed);
            if previous == observed {
                return candidate;
            }
            observed = previous;
        }
    }

    /// Returns the most recent timestamp handed out, without advancing.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }

    fn elapsed_micros(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn timestamps_strictly_increase() {
        let clock = Clock::new();
        let mut previous = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next > previous);
            previous = next;
        }
        assert_eq!(clock.last(), previous);
    }

    #[test]
    fn concurrent_timestamps_are_unique() {
        let clock = Arc::new(Clock::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = Arc::clone(&clock);
                thread::spawn(move || (0..500).map(|_| clock.now()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for stamp in handle.join().expect("Thread join failed") {
                assert!(seen.insert(stamp), "duplicate timestamp {stamp}");
            }
        }
        assert_eq!(seen.len(), 2_000);
    }
}
