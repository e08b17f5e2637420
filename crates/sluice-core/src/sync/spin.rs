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

//! A busy-waiting mutual-exclusion primitive.
//!
//! [`SpinLock`] never parks the calling thread: `lock` spins on a single
//! flag word until it observes the `0 -> 1` transition. Critical sections
//! guarded by it must stay O(1) (an index update, an `Arc` clone, a pointer
//! swap) and must never call back into user code.
//!
//! The lock is **not reentrant**. Calling [`SpinLock::lock`] while the same
//! thread already holds a guard deadlocks; this is not checked at runtime.

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};

use super::atomic::AtomicWord;

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;

/// A spin lock protecting a value of type `T`.
pub struct SpinLock<T: ?Sized = ()> {
    flag: AtomicU32,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` is serialised by `flag`; a guard is only handed
// out to the thread that won the 0 -> 1 transition.
unsafe impl<T: ?Sized + Send> Send for SpinLock<T> {}
unsafe impl<T: ?Sized + Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Creates an unlocked spin lock around `data`.
    pub const fn new(data: T) -> Self {
        Self {
            flag: AtomicU32::new(UNLOCKED),
            data: UnsafeCell::new(data),
        }
    }

    /// Consumes the lock and returns the protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> SpinLock<T> {
    /// Acquires the lock, spinning until it becomes available.
    ///
    /// The returned guard releases the lock when dropped, including during
    /// unwinding.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        while self.flag.compare_and_set(LOCKED, UNLOCKED) != UNLOCKED {
            // Read-only wait so contending cores do not bounce the cache line.
            while self.flag.load(Ordering::Relaxed) != UNLOCKED {
                std::hint::spin_loop();
            }
        }
        SpinLockGuard { lock: self }
    }

    /// Makes a single attempt to acquire the lock.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        if self.flag.compare_and_set(LOCKED, UNLOCKED) == UNLOCKED {
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Returns `true` if some thread currently holds the lock.
    ///
    /// Advisory only: the answer may be stale by the time it is read.
    pub fn is_locked(&self) -> bool {
        self.flag.load(Ordering::Relaxed) != UNLOCKED
    }

    /// Returns a mutable reference to the data without locking.
    ///
    /// Exclusive access is already guaranteed by the `&mut self` borrow.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    #[inline]
    fn unlock(&self) {
        self.flag.store(UNLOCKED, Ordering::Release);
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Scoped access to the data of a held [`SpinLock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SpinLockGuard<'a, T: ?Sized> {
    lock: &'a SpinLock<T>,
}

impl<T: ?Sized> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard proves this thread holds the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard proves this thread holds the lock.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
