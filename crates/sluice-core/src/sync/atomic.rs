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

//! Word-sized atomic read-modify-write primitives.
//!
//! Every operation here is total and non-blocking: nothing allocates and
//! nothing takes a lock. The memory ordering of each primitive is fixed so
//! that callers (the [`SpinLock`](super::SpinLock), the event queue indices,
//! the event clock) can reason about it without passing orderings around.
//!
//! | Operation         | Ordering                     |
//! |-------------------|------------------------------|
//! | `set`             | `AcqRel` swap                |
//! | `compare_and_set` | `AcqRel` on success, `Acquire` on failure |
//! | `increment`       | `AcqRel` fetch-add           |
//! | `decrement`       | `AcqRel` fetch-sub           |

use std::sync::atomic::{
    AtomicI32, AtomicI64, AtomicIsize, AtomicPtr, AtomicU32, AtomicU64, AtomicUsize, Ordering,
};

// Pointer operations rely on pointers and `usize` having the same width.
const _: () = assert!(std::mem::size_of::<*mut ()>() == std::mem::size_of::<usize>());
const _: () = assert!(std::mem::size_of::<AtomicPtr<()>>() == std::mem::size_of::<AtomicUsize>());

/// Atomic read-modify-write operations on an integer machine word.
pub trait AtomicWord {
    /// The plain integer type stored in the atomic.
    type Value: Copy + Eq;

    /// Stores `value` and returns the previous contents.
    fn set(&self, value: Self::Value) -> Self::Value;

    /// Stores `value` only if the current contents equal `comparand`.
    ///
    /// Always returns the value observed before the (possibly skipped)
    /// write; the exchange succeeded iff the result equals `comparand`.
    fn compare_and_set(&self, value: Self::Value, comparand: Self::Value) -> Self::Value;

    /// Adds `delta` and returns the new value. Wraps on overflow.
    fn increment(&self, delta: Self::Value) -> Self::Value;

    /// Subtracts one and returns the new value. Wraps on overflow.
    fn decrement(&self) -> Self::Value;
}

macro_rules! impl_atomic_word {
    ($($atomic:ty => $int:ty),* $(,)?) => {
        $(
            impl AtomicWord for $atomic {
                type Value = $int;

                #[inline]
                fn set(&self, value: $int) -> $int {
                    self.swap(value, Ordering::AcqRel)
                }

                #[inline]
                fn compare_and_set(&self, value: $int, comparand: $int) -> $int {
                    match self.compare_exchange(comparand, value, Ordering::AcqRel, Ordering::Acquire) {
                        Ok(previous) | Err(previous) => previous,
                    }
                }

                #[inline]
                fn increment(&self, delta: $int) -> $int {
                    self.fetch_add(delta, Ordering::AcqRel).wrapping_add(delta)
                }

                #[inline]
                fn decrement(&self) -> $int {
                    self.fetch_sub(1, Ordering::AcqRel).wrapping_sub(1)
                }
            }
        )*
    };
}

impl_atomic_word! {
    AtomicI32 => i32,
    AtomicU32 => u32,
    AtomicI64 => i64,
    AtomicU64 => u64,
    AtomicIsize => isize,
    AtomicUsize => usize,
}

/// Atomic exchange operations on a pointer-sized slot.
pub trait AtomicPointer {
    /// The pointee type.
    type Target;

    /// Stores `value` and returns the previous pointer.
    fn set(&self, value: *mut Self::Target) -> *mut Self::Target;

    /// Stores `value` only if the current pointer equals `comparand`,
    /// returning the pointer observed before the attempt.
    fn compare_and_set(
        &self,
        value: *mut Self::Target,
        comparand: *mut Self::Target,
    ) -> *mut Self::Target;
}

impl<T> AtomicPointer for AtomicPtr<T> {
    type Target = T;

    #[inline]
    fn set(&self, value: *mut T) -> *mut T {
        self.swap(value, Ordering::AcqRel)
    }

    #[inline]
    fn compare_and_set(&self, value: *mut T, comparand: *mut T) -> *mut T {
        match self.compare_exchange(comparand, value, Ordering::AcqRel, Ordering::Acquire) {
            Ok(previous) | Err(previous) => previous,
        }
    }
}

/// Raises `target` to at least `candidate`, returning the value now stored.
///
/// Built from [`AtomicWord::compare_and_set`]; used where a shared counter
/// must only move forward (peak lengths, monotonic timestamps).
pub fn fetch_max_u64(target: &AtomicU64, candidate: u64) -> u64 {
    let mut observed = target.load(Ordering::Acquire);
    loop {
        if observed >= candidate {
            return observed;
        }
        let previous = target.compare_and_set(candidate, observed);
        if previous == observed {
            return candidate;
        }
        observed = previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn set_returns_previous_value() {
        let word = AtomicI32::new(7);
        assert_eq!(word.set(11), 7);
        assert_eq!(word.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn compare_and_set_only_writes_on_match() {
        let word = AtomicUsize::new(0);

        // Mismatch: nothing is written, the observed value comes back.
        assert_eq!(word.compare_and_set(5, 1), 0);
        assert_eq!(word.load(Ordering::SeqCst), 0);

        // Match: the write happens and the comparand comes back.
        assert_eq!(word.compare_and_set(5, 0), 0);
        assert_eq!(word.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn increment_and_decrement_return_new_value() {
        let word = AtomicI64::new(10);
        assert_eq!(word.increment(1), 11);
        assert_eq!(word.increment(4), 15);
        assert_eq!(word.decrement(), 14);
    }

    #[test]
    fn increment_wraps_instead_of_panicking() {
        let word = AtomicU32::new(u32::MAX);
        assert_eq!(word.increment(1), 0);
        assert_eq!(word.decrement(), u32::MAX);
    }

    #[test]
    fn pointer_operations_swap_addresses() {
        let mut a = 1u8;
        let mut b = 2u8;
        let pa: *mut u8 = &mut a;
        let pb: *mut u8 = &mut b;

        let slot = AtomicPtr::new(pa);
        assert_eq!(slot.compare_and_set(pb, std::ptr::null_mut()), pa);
        assert_eq!(slot.load(Ordering::SeqCst), pa);
        assert_eq!(slot.compare_and_set(pb, pa), pa);
        assert_eq!(slot.set(std::ptr::null_mut()), pb);
    }

    #[test]
    fn fetch_max_never_moves_backwards() {
        let word = AtomicU64::new(50);
        assert_eq!(fetch_max_u64(&word, 20), 50);
        assert_eq!(fetch_max_u64(&word, 80), 80);
        assert_eq!(word.load(Ordering::SeqCst), 80);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        counter.increment(1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread join failed");
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8_000);
    }
}
